use std::{env, path::PathBuf, process};

use nalgebra::{DMatrix, DVector};
use robot_wrapper::{
    config::ViewerConfig, configuration::integrate, dynamics::forward_dynamics,
    joint::RootJoint, plot::plot, types::Float, KinematicsLevel, RobotWrapper,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Usage: robot_info <robot.urdf> [--floating] [--viewer <config.json>]
pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = env::args().skip(1);
    let mut urdf = None;
    let mut root_joint = None;
    let mut viewer_config = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--floating" => root_joint = Some(RootJoint::FreeFlyer),
            "--viewer" => viewer_config = args.next(),
            _ => urdf = Some(arg),
        }
    }
    let Some(urdf) = urdf else {
        eprintln!("usage: robot_info <robot.urdf> [--floating] [--viewer <config.json>]");
        process::exit(2);
    };

    let mut robot = match RobotWrapper::new::<PathBuf>(&urdf, None, root_joint) {
        Ok(robot) => robot,
        Err(e) => {
            error!(error = %e, "cannot load {}", urdf);
            process::exit(1);
        }
    };

    let q0 = robot.q0.clone();
    info!(nq = robot.nq(), nv = robot.nv(), "loaded {}", urdf);
    let com = robot.com(KinematicsLevel::Position(&q0), true);
    println!("com = {}", com.position().transpose());
    println!("M(q0) = {}", robot.mass(&q0));
    println!("g(q0) = {}", robot.gravity(&q0).transpose());

    // Let the robot fall from rest under gravity
    let final_time = 2.0;
    let dt = 1.0 / 100.0;
    let num_steps = (final_time / dt) as usize;
    let mut q = q0.clone();
    let mut v = DVector::zeros(robot.nv());
    let tau = DVector::zeros(robot.nv());
    let mut trajectory = DMatrix::zeros(robot.nq(), num_steps);
    let mut com_heights: Vec<Float> = vec![];
    for k in 0..num_steps {
        let vdot = forward_dynamics(&robot.model, &mut robot.data, &q, &v, &tau);
        v += vdot * dt;
        q = integrate(&robot.model, &q, &(&v * dt));
        trajectory.set_column(k, &q);

        let com = robot.com(KinematicsLevel::Position(&q), true);
        com_heights.push(com.position().z);
    }

    if let Err(e) = plot("com.png", "center of mass height", &[("z", com_heights)], dt) {
        error!(error = %e, "cannot plot the center of mass");
    }

    let config = match viewer_config {
        Some(path) => match ViewerConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                error!(error = %e, "cannot read {}", path);
                process::exit(1);
            }
        },
        None => ViewerConfig {
            load_model: true,
            ..ViewerConfig::default()
        },
    };
    robot.init_display(&config);
    if robot.has_viewer() {
        if let Err(e) = robot.play(&trajectory, dt) {
            error!(error = %e, "playback stopped");
        }
    }
}
