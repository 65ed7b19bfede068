use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpStream, ToSocketAddrs},
};

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::{Gui, ViewerError, WindowId};
use crate::{config::ViewerConfig, types::Float};

/// A viewer reached over TCP.
///
/// Requests and replies are JSON objects, one per line. A request is
/// `{"id", "method", "params"}` and its reply `{"result"}` on success or
/// `{"error"}` with a message.
pub struct TcpGui {
    reader: BufReader<TcpStream>,
    writer: TcpStream,
    next_id: u64,
}

#[derive(Serialize)]
struct Request<'a> {
    id: u64,
    method: &'a str,
    params: Value,
}

#[derive(Deserialize)]
struct Reply {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl TcpGui {
    pub fn connect(config: &ViewerConfig) -> Result<Self, ViewerError> {
        let connect_error = |source| ViewerError::Connect {
            address: config.address.clone(),
            source,
        };

        let mut last_error = None;
        let mut stream = None;
        for addr in config.address.to_socket_addrs().map_err(connect_error)? {
            let attempt = match config.connect_timeout() {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(s) => {
                    stream = Some(s);
                    break;
                }
                Err(e) => last_error = Some(e),
            }
        }
        let stream = match (stream, last_error) {
            (Some(s), _) => s,
            (None, Some(e)) => return Err(connect_error(e)),
            (None, None) => {
                return Err(connect_error(std::io::Error::new(
                    std::io::ErrorKind::AddrNotAvailable,
                    "address resolved to nothing",
                )))
            }
        };

        stream.set_read_timeout(config.read_timeout())?;
        stream.set_nodelay(true)?;
        debug!(address = %config.address, "connected to viewer");

        Ok(TcpGui {
            reader: BufReader::new(stream.try_clone()?),
            writer: stream,
            next_id: 0,
        })
    }

    fn call(&mut self, method: &str, params: Value) -> Result<Value, ViewerError> {
        let request = Request {
            id: self.next_id,
            method,
            params,
        };
        self.next_id += 1;

        let mut line =
            serde_json::to_string(&request).map_err(|e| ViewerError::Protocol(e.to_string()))?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;

        let mut reply = String::new();
        if self.reader.read_line(&mut reply)? == 0 {
            return Err(ViewerError::Disconnected);
        }
        let reply: Reply =
            serde_json::from_str(&reply).map_err(|e| ViewerError::Protocol(e.to_string()))?;
        match reply.error {
            Some(message) => Err(ViewerError::Remote(message)),
            None => Ok(reply.result),
        }
    }
}

fn window_id(value: &Value) -> Result<WindowId, ViewerError> {
    value
        .as_i64()
        .ok_or_else(|| ViewerError::Protocol(format!("expected a window id, got {}", value)))
}

impl Gui for TcpGui {
    fn get_window_id(&mut self, name: &str) -> Result<Option<WindowId>, ViewerError> {
        let result = self.call("getWindowID", json!([name]))?;
        if result.is_null() {
            return Ok(None);
        }
        window_id(&result).map(Some)
    }

    fn create_window(&mut self, name: &str) -> Result<WindowId, ViewerError> {
        window_id(&self.call("createWindow", json!([name]))?)
    }

    fn create_scene_with_floor(&mut self, scene: &str) -> Result<(), ViewerError> {
        self.call("createSceneWithFloor", json!([scene])).map(|_| ())
    }

    fn add_scene_to_window(&mut self, scene: &str, window: WindowId) -> Result<(), ViewerError> {
        self.call("addSceneToWindow", json!([scene, window])).map(|_| ())
    }

    fn add_urdf(
        &mut self,
        node: &str,
        urdf_path: &str,
        mesh_dir: &str,
    ) -> Result<(), ViewerError> {
        self.call("addURDF", json!([node, urdf_path, mesh_dir])).map(|_| ())
    }

    fn apply_configuration(
        &mut self,
        node: &str,
        configuration: &[Float; 7],
    ) -> Result<(), ViewerError> {
        self.call("applyConfiguration", json!([node, configuration]))
            .map(|_| ())
    }

    fn refresh(&mut self) -> Result<(), ViewerError> {
        self.call("refresh", json!([])).map(|_| ())
    }
}

#[cfg(test)]
mod tcp_tests {
    use std::{net::TcpListener, thread};

    use super::*;

    /// A one-client viewer that answers each request with `answer`, and
    /// returns the requests it saw
    fn serve(answer: fn(&Value) -> Value) -> (ViewerConfig, thread::JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ViewerConfig {
            address: listener.local_addr().unwrap().to_string(),
            ..ViewerConfig::default()
        };
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut writer = stream.try_clone().unwrap();
            let mut seen = vec![];
            for line in BufReader::new(stream).lines() {
                let request: Value = serde_json::from_str(&line.unwrap()).unwrap();
                let reply = answer(&request);
                writeln!(writer, "{}", reply).unwrap();
                seen.push(request);
            }
            seen
        });
        (config, handle)
    }

    #[test]
    fn requests_are_json_lines() {
        // Arrange
        let (config, server) = serve(|request| match request["method"].as_str() {
            Some("createWindow") => json!({"result": 7}),
            Some("getWindowID") => json!({"result": null}),
            _ => json!({"result": true}),
        });
        let mut gui = TcpGui::connect(&config).unwrap();

        // Act
        let missing = gui.get_window_id("pinocchio").unwrap();
        let id = gui.create_window("pinocchio").unwrap();
        gui.apply_configuration("world/arm/hand", &[1., 2., 3., 1., 0., 0., 0.])
            .unwrap();
        drop(gui);

        // Assert
        assert_eq!(missing, None);
        assert_eq!(id, 7);
        let seen = server.join().unwrap();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2]["method"], "applyConfiguration");
        assert_eq!(seen[2]["params"][0], "world/arm/hand");
        assert_eq!(seen[2]["params"][1][3], 1.);
        assert_eq!(seen[1]["id"], 1);
    }

    #[test]
    fn zero_timeouts_still_connect() {
        // Arrange
        let (config, server) = serve(|_| json!({"result": true}));
        let config = ViewerConfig {
            connect_timeout_ms: 0,
            read_timeout_ms: 0,
            ..config
        };

        // Act
        let mut gui = TcpGui::connect(&config).unwrap();
        gui.refresh().unwrap();
        drop(gui);

        // Assert
        assert_eq!(server.join().unwrap().len(), 1);
    }

    #[test]
    fn remote_errors_surface() {
        let (config, _server) = serve(|_| json!({"error": "no such node"}));
        let mut gui = TcpGui::connect(&config).unwrap();

        let result = gui.refresh();

        assert!(matches!(result, Err(ViewerError::Remote(m)) if m == "no such node"));
    }

    #[test]
    fn connection_refused() {
        // Arrange: grab a free port, then close it
        let address = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .to_string();
        let config = ViewerConfig {
            address,
            ..ViewerConfig::default()
        };

        // Act
        let result = TcpGui::connect(&config);

        // Assert
        assert!(matches!(result, Err(ViewerError::Connect { .. })));
    }
}
