use std::path::PathBuf;

use thiserror::Error;

use crate::viewer::ViewerError;

/// Errors raised while loading a robot or talking to a viewer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("XML parse error: {0}")]
    XmlParse(String),

    #[error("missing required element: {element} in {context}")]
    MissingElement {
        element: &'static str,
        context: String,
    },

    #[error("missing required attribute: {attribute} on {element}")]
    MissingAttribute {
        attribute: &'static str,
        element: String,
    },

    #[error("invalid value for {attribute} on {element}: {message}")]
    InvalidAttribute {
        attribute: &'static str,
        element: String,
        message: String,
    },

    #[error("unknown joint type: {0}")]
    UnknownJointType(String),

    #[error("reference to undefined link: {link_name} in joint {joint_name}")]
    UndefinedLink {
        link_name: String,
        joint_name: String,
    },

    #[error("no root link found (all links are children of joints)")]
    NoRootLink,

    #[error("multiple root links found: {0:?}")]
    MultipleRootLinks(Vec<String>),

    #[error("kinematic loop detected at link {0}")]
    KinematicLoop(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The crate was built without the `geometry` feature
    #[error("this build has no geometry support; enable the `geometry` feature")]
    GeometryUnsupported,

    #[error("package directory #{index} is not a valid path string: {entry:?}")]
    InvalidPackageDirs { index: usize, entry: PathBuf },

    #[error("cannot resolve {0}: no package directories given and ROS_PACKAGE_PATH is unset")]
    NoPackageDirs(String),

    #[error("mesh {mesh} not found in {searched:?}")]
    MeshNotFound {
        mesh: String,
        searched: Vec<PathBuf>,
    },

    #[error("joint {0} has non-finite position limits")]
    UnboundedLimits(String),

    #[error("body {0} has no visual")]
    NoVisual(String),

    #[error("no joint named {0}")]
    UnknownName(String),

    #[error("plotting failed: {0}")]
    Plot(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Viewer(#[from] ViewerError),
}

impl Error {
    pub fn missing_element(element: &'static str, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element,
            context: context.into(),
        }
    }

    pub fn missing_attribute(attribute: &'static str, element: impl Into<String>) -> Self {
        Self::MissingAttribute {
            attribute,
            element: element.into(),
        }
    }

    pub fn invalid_attribute(
        attribute: &'static str,
        element: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidAttribute {
            attribute,
            element: element.into(),
            message: message.into(),
        }
    }

    pub fn undefined_link(link_name: impl Into<String>, joint_name: impl Into<String>) -> Self {
        Self::UndefinedLink {
            link_name: link_name.into(),
            joint_name: joint_name.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = Error::invalid_attribute("xyz", "origin", "expected 3 values");
        assert!(err.to_string().contains("expected 3 values"));

        let err = Error::InvalidPackageDirs {
            index: 1,
            entry: PathBuf::new(),
        };
        assert!(err.to_string().contains("#1"));
    }

    #[test]
    fn viewer_errors_convert() {
        let err: Error = ViewerError::Disconnected.into();
        assert!(matches!(err, Error::Viewer(ViewerError::Disconnected)));
    }
}
