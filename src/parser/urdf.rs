//! URDF XML reader.

use na::Vector3;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::BufRead;

use crate::{
    error::{Error, Result},
    parser::types::{
        UrdfCollision, UrdfGeometry, UrdfInertia, UrdfInertial, UrdfJoint, UrdfJointDynamics,
        UrdfJointLimit, UrdfJointType, UrdfLink, UrdfOrigin, UrdfRobot, UrdfVisual,
    },
    types::Float,
};

/// Parse a URDF document.
pub fn parse_urdf_str(xml: &str) -> Result<UrdfRobot> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    parse_urdf_reader(&mut reader)
}

fn parse_urdf_reader<R: BufRead>(reader: &mut Reader<R>) -> Result<UrdfRobot> {
    let mut buf = Vec::new();
    let mut robot: Option<UrdfRobot> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"robot" => {
                robot = Some(parse_robot(reader, e)?);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    robot.ok_or_else(|| Error::missing_element("robot", "URDF document"))
}

fn parse_robot<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<UrdfRobot> {
    let name = get_attribute(start, "name")?;
    let mut robot = UrdfRobot::new(name);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"link" => robot.links.push(parse_link(reader, e)?),
                    b"joint" => robot.joints.push(parse_joint(reader, e)?),
                    // material, gazebo, transmission...
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"link" => {
                robot.links.push(UrdfLink::new(get_attribute(e, "name")?));
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"robot" => break,
            Ok(Event::Eof) => return Err(Error::XmlParse("unexpected EOF in robot".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(robot)
}

fn parse_link<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<UrdfLink> {
    let name = get_attribute(start, "name")?;
    let mut link = UrdfLink::new(name);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"inertial" => link.inertial = Some(parse_inertial(reader)?),
                    b"visual" => {
                        let (name, origin, geometry) = parse_shape(reader, e, b"visual")?;
                        link.visuals.push(UrdfVisual {
                            name,
                            origin,
                            geometry,
                        });
                    }
                    b"collision" => {
                        let (name, origin, geometry) = parse_shape(reader, e, b"collision")?;
                        link.collisions.push(UrdfCollision {
                            name,
                            origin,
                            geometry,
                        });
                    }
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == b"link" => break,
            Ok(Event::Eof) => return Err(Error::XmlParse("unexpected EOF in link".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(link)
}

fn parse_inertial<R: BufRead>(reader: &mut Reader<R>) -> Result<UrdfInertial> {
    let mut inertial = UrdfInertial::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"origin" => inertial.origin = parse_origin(e)?,
                b"mass" => inertial.mass = parse_mass(e)?,
                b"inertia" => inertial.inertia = parse_inertia_element(e),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"inertial" => break,
            Ok(Event::Eof) => return Err(Error::XmlParse("unexpected EOF in inertial".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(inertial)
}

fn parse_origin(e: &BytesStart) -> Result<UrdfOrigin> {
    let xyz = get_attribute_opt(e, "xyz")
        .map(|s| parse_vector3(&s))
        .transpose()?
        .unwrap_or_else(Vector3::zeros);

    let rpy = get_attribute_opt(e, "rpy")
        .map(|s| parse_vector3(&s))
        .transpose()?
        .unwrap_or_else(Vector3::zeros);

    Ok(UrdfOrigin::new(xyz, rpy))
}

fn parse_mass(e: &BytesStart) -> Result<Float> {
    let value_str = get_attribute(e, "value")?;
    value_str
        .parse()
        .map_err(|_| Error::invalid_attribute("value", "mass", "expected a number"))
}

fn parse_inertia_element(e: &BytesStart) -> UrdfInertia {
    UrdfInertia {
        ixx: parse_float_attr(e, "ixx").unwrap_or(0.0),
        ixy: parse_float_attr(e, "ixy").unwrap_or(0.0),
        ixz: parse_float_attr(e, "ixz").unwrap_or(0.0),
        iyy: parse_float_attr(e, "iyy").unwrap_or(0.0),
        iyz: parse_float_attr(e, "iyz").unwrap_or(0.0),
        izz: parse_float_attr(e, "izz").unwrap_or(0.0),
    }
}

/// Body of a `<visual>` or `<collision>` element
fn parse_shape<R: BufRead>(
    reader: &mut Reader<R>,
    start: &BytesStart,
    tag: &[u8],
) -> Result<(Option<String>, UrdfOrigin, UrdfGeometry)> {
    let name = get_attribute_opt(start, "name");
    let context = String::from_utf8_lossy(tag).to_string();
    let mut origin = UrdfOrigin::default();
    let mut geometry: Option<UrdfGeometry> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let elem_name = e.name().as_ref().to_vec();
                match elem_name.as_slice() {
                    b"origin" => {
                        origin = parse_origin(e)?;
                        skip_element(reader, &elem_name)?;
                    }
                    b"geometry" => geometry = Some(parse_geometry(reader)?),
                    _ => skip_element(reader, &elem_name)?,
                }
            }
            Ok(Event::Empty(ref e)) if e.name().as_ref() == b"origin" => {
                origin = parse_origin(e)?;
            }
            Ok(Event::End(ref e)) if e.name().as_ref() == tag => break,
            Ok(Event::Eof) => {
                return Err(Error::XmlParse(format!("unexpected EOF in {context}")));
            }
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    let geometry = geometry.ok_or_else(|| Error::missing_element("geometry", context))?;
    Ok((name, origin, geometry))
}

fn parse_geometry<R: BufRead>(reader: &mut Reader<R>) -> Result<UrdfGeometry> {
    let mut buf = Vec::new();
    let mut geometry: Option<UrdfGeometry> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"box" => {
                    let size = get_attribute(e, "size")?;
                    let size = parse_vector3(&size)?;
                    geometry = Some(UrdfGeometry::Box { size });
                }
                b"cylinder" => {
                    let radius = parse_float_attr(e, "radius")
                        .ok_or_else(|| Error::missing_attribute("radius", "cylinder"))?;
                    let length = parse_float_attr(e, "length")
                        .ok_or_else(|| Error::missing_attribute("length", "cylinder"))?;
                    geometry = Some(UrdfGeometry::Cylinder { radius, length });
                }
                b"sphere" => {
                    let radius = parse_float_attr(e, "radius")
                        .ok_or_else(|| Error::missing_attribute("radius", "sphere"))?;
                    geometry = Some(UrdfGeometry::Sphere { radius });
                }
                b"mesh" => {
                    let filename = get_attribute(e, "filename")?;
                    let scale = get_attribute_opt(e, "scale")
                        .map(|s| parse_vector3(&s))
                        .transpose()?;
                    geometry = Some(UrdfGeometry::Mesh { filename, scale });
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"geometry" => break,
            Ok(Event::Eof) => return Err(Error::XmlParse("unexpected EOF in geometry".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    geometry.ok_or_else(|| Error::missing_element("shape", "geometry"))
}

fn parse_joint<R: BufRead>(reader: &mut Reader<R>, start: &BytesStart) -> Result<UrdfJoint> {
    let name = get_attribute(start, "name")?;
    let type_str = get_attribute(start, "type")?;
    let joint_type =
        UrdfJointType::from_name(&type_str).ok_or(Error::UnknownJointType(type_str))?;

    let mut parent: Option<String> = None;
    let mut child: Option<String> = None;
    let mut origin = UrdfOrigin::default();
    let mut axis = Vector3::x();
    let mut limit: Option<UrdfJointLimit> = None;
    let mut dynamics: Option<UrdfJointDynamics> = None;

    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"parent" => parent = Some(get_attribute(e, "link")?),
                b"child" => child = Some(get_attribute(e, "link")?),
                b"origin" => origin = parse_origin(e)?,
                b"axis" => {
                    if let Some(xyz) = get_attribute_opt(e, "xyz") {
                        axis = parse_vector3(&xyz)?;
                    }
                }
                b"limit" => limit = Some(parse_joint_limit(e)),
                b"dynamics" => dynamics = Some(parse_joint_dynamics(e)),
                _ => {}
            },
            Ok(Event::End(ref e)) if e.name().as_ref() == b"joint" => break,
            Ok(Event::Eof) => return Err(Error::XmlParse("unexpected EOF in joint".into())),
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    let parent =
        parent.ok_or_else(|| Error::missing_element("parent", format!("joint '{name}'")))?;
    let child = child.ok_or_else(|| Error::missing_element("child", format!("joint '{name}'")))?;

    if axis.norm() == 0. {
        return Err(Error::invalid_attribute(
            "xyz",
            format!("axis of joint '{name}'"),
            "axis must be non-zero",
        ));
    }

    Ok(UrdfJoint {
        name,
        joint_type,
        parent,
        child,
        origin,
        axis,
        limit,
        dynamics,
    })
}

fn parse_joint_limit(e: &BytesStart) -> UrdfJointLimit {
    UrdfJointLimit {
        lower: parse_float_attr(e, "lower").unwrap_or(0.0),
        upper: parse_float_attr(e, "upper").unwrap_or(0.0),
        effort: parse_float_attr(e, "effort").unwrap_or(0.0),
        velocity: parse_float_attr(e, "velocity").unwrap_or(0.0),
    }
}

fn parse_joint_dynamics(e: &BytesStart) -> UrdfJointDynamics {
    UrdfJointDynamics {
        damping: parse_float_attr(e, "damping").unwrap_or(0.0),
        friction: parse_float_attr(e, "friction").unwrap_or(0.0),
    }
}

// Helpers

fn get_attribute(e: &BytesStart, name: &'static str) -> Result<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return attr
                .unescape_value()
                .map(|v| v.into_owned())
                .map_err(|err| Error::invalid_attribute(name, element_name(e), err.to_string()));
        }
    }
    Err(Error::missing_attribute(name, element_name(e)))
}

fn get_attribute_opt(e: &BytesStart, name: &str) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == name.as_bytes() {
            return attr.unescape_value().ok().map(|v| v.into_owned());
        }
    }
    None
}

fn parse_float_attr(e: &BytesStart, name: &str) -> Option<Float> {
    get_attribute_opt(e, name).and_then(|s| s.parse().ok())
}

/// Parse a space-separated vector3 string.
fn parse_vector3(s: &str) -> Result<Vector3<Float>> {
    let parts: Vec<Float> = s
        .split_whitespace()
        .map(|p| p.parse::<Float>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| Error::XmlParse(format!("invalid vector3: {s}")))?;

    if parts.len() != 3 {
        return Err(Error::XmlParse(format!(
            "expected 3 values in vector, got {}: {s}",
            parts.len()
        )));
    }

    Ok(Vector3::new(parts[0], parts[1], parts[2]))
}

fn element_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.name().as_ref()).to_string()
}

/// Skip an element and all its children.
fn skip_element<R: BufRead>(reader: &mut Reader<R>, name: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let mut depth = 1;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) if e.name().as_ref() == name => depth += 1,
            Ok(Event::End(ref e)) if e.name().as_ref() == name => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(Error::XmlParse(e.to_string())),
        }
        buf.clear();
    }

    Ok(())
}

#[cfg(test)]
mod urdf_tests {
    use super::*;

    #[test]
    fn parse_links_and_joints() {
        // Arrange
        let xml = r#"
            <robot name="test">
                <material name="grey"><color rgba="0.5 0.5 0.5 1"/></material>
                <link name="base">
                    <inertial>
                        <origin xyz="1 2 3" rpy="0.1 0.2 0.3"/>
                        <mass value="1.5"/>
                        <inertia ixx="1" ixy="0" ixz="0" iyy="2" iyz="0" izz="3"/>
                    </inertial>
                    <visual>
                        <origin xyz="0 0 0.1"/>
                        <geometry><mesh filename="package://pkg/base.stl" scale="2 2 2"/></geometry>
                        <material name="grey"/>
                    </visual>
                </link>
                <link name="child"/>
                <joint name="joint1" type="revolute">
                    <parent link="base"/>
                    <child link="child"/>
                    <axis xyz="0 0 1"/>
                    <limit lower="-1.57" upper="1.57" effort="10" velocity="1"/>
                    <dynamics damping="0.1"/>
                </joint>
            </robot>
        "#;

        // Act
        let robot = parse_urdf_str(xml).unwrap();

        // Assert
        assert_eq!(robot.name, "test");
        assert_eq!(robot.links.len(), 2);
        let base = robot.link("base").unwrap();
        let inertial = base.inertial.unwrap();
        assert_eq!(inertial.mass, 1.5);
        assert_eq!(inertial.origin.xyz, Vector3::new(1., 2., 3.));
        assert_eq!(inertial.inertia.izz, 3.);
        assert_eq!(base.visuals.len(), 1);
        assert_eq!(base.visuals[0].origin.xyz.z, 0.1);
        assert_eq!(
            base.visuals[0].geometry,
            UrdfGeometry::Mesh {
                filename: "package://pkg/base.stl".to_string(),
                scale: Some(Vector3::new(2., 2., 2.)),
            }
        );

        let joint = robot.joint("joint1").unwrap();
        assert_eq!(joint.joint_type, UrdfJointType::Revolute);
        assert_eq!(joint.parent, "base");
        assert_eq!(joint.axis, Vector3::z());
        assert_eq!(joint.limit.unwrap().upper, 1.57);
        assert_eq!(joint.dynamics.unwrap().damping, 0.1);
    }

    #[test]
    fn unknown_joint_type() {
        let xml = r#"
            <robot name="test">
                <link name="a"/>
                <link name="b"/>
                <joint name="j" type="screw">
                    <parent link="a"/>
                    <child link="b"/>
                </joint>
            </robot>
        "#;
        let result = parse_urdf_str(xml);
        assert!(matches!(result, Err(Error::UnknownJointType(t)) if t == "screw"));
    }

    #[test]
    fn missing_robot_name() {
        let result = parse_urdf_str(r#"<robot><link name="base"/></robot>"#);
        assert!(matches!(result, Err(Error::MissingAttribute { attribute: "name", .. })));
    }

    #[test]
    fn joint_without_child() {
        let xml = r#"
            <robot name="test">
                <link name="a"/>
                <joint name="j" type="fixed"><parent link="a"/></joint>
            </robot>
        "#;
        let result = parse_urdf_str(xml);
        assert!(matches!(result, Err(Error::MissingElement { element: "child", .. })));
    }

    #[test]
    fn attribute_entities_are_unescaped() {
        let xml = r#"
            <robot name="a&amp;b">
                <link name="base">
                    <visual><geometry><mesh filename="m&amp;n.stl"/></geometry></visual>
                </link>
            </robot>
        "#;

        let robot = parse_urdf_str(xml).unwrap();

        assert_eq!(robot.name, "a&b");
        assert_eq!(
            robot.link("base").unwrap().visuals[0].geometry,
            UrdfGeometry::Mesh {
                filename: "m&n.stl".to_string(),
                scale: None,
            }
        );
    }

    #[test]
    fn malformed_vector() {
        assert!(parse_vector3("1 2").is_err());
        assert_eq!(parse_vector3("  1   2   3  ").unwrap(), Vector3::new(1., 2., 3.));
    }
}
