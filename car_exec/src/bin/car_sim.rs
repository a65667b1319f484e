//! # Car Simulation
//!
//! Simulates the kinematic car driven by one of the controllers and archives
//! the time, state and input history of the run as `car_sim.csv` in the
//! session archive.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use car_lib::{
    ctrl::{self, Controller, FeedForwardController, FeedbackController},
    model::{Car, CarParams},
    sim::{SimParams, Simulation},
};
use color_eyre::{eyre::WrapErr, Result};
use log::{debug, info};
use serde::Serialize;
use structopt::StructOpt;
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "car_sim", about = "Simulate the kinematic car")]
struct Opts {
    /// The controller driving the car
    #[structopt(subcommand)]
    ctrl: CtrlChoice,
}

/// A single archived sample of the simulation.
#[derive(Debug, Serialize)]
struct SimRecord {
    t_s: f64,
    x1_m: f64,
    x2_m: f64,
    theta_rad: f64,
    u1_ms: f64,
    u2_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, StructOpt)]
enum CtrlChoice {
    /// Decaying velocity and a fixed steering angle
    #[structopt(name = "constant")]
    Constant,

    /// Flatness based open loop tracking of the planned path
    #[structopt(name = "feedforward")]
    FeedForward,

    /// Flatness based closed loop tracking of the planned path
    #[structopt(name = "feedback")]
    Feedback,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session = Session::new("car_sim", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Car Simulation\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let sim_params: SimParams = util::params::load("sim.toml").wrap_err("Could not load sim params")?;
    let car_params: CarParams = util::params::load("car.toml").wrap_err("Could not load car params")?;
    let ctrl_params: ctrl::Params =
        util::params::load("ctrl.toml").wrap_err("Could not load ctrl params")?;

    // Derive the width if the file didn't give one
    let car_params = if car_params.w > 0.0 {
        car_params
    } else {
        CarParams::with_length(car_params.l)
    };

    session
        .save_json("sim_params.json", &sim_params)
        .wrap_err("Failed to save the sim params")?;
    session
        .save_json("car_params.json", &car_params)
        .wrap_err("Failed to save the car params")?;

    // ---- MODULE INIT ----

    info!("Using the {:?} controller", opts.ctrl);

    let controller: Box<dyn Controller> = match opts.ctrl {
        CtrlChoice::Constant => Box::new(ctrl_params.constant),
        CtrlChoice::FeedForward => Box::new(FeedForwardController::new(
            ctrl_params
                .flat_outputs()
                .wrap_err("Failed to build the flat output planners")?,
            car_params,
        )),
        CtrlChoice::Feedback => Box::new(FeedbackController::new(
            ctrl_params
                .flat_outputs()
                .wrap_err("Failed to build the flat output planners")?,
            car_params,
            ctrl_params.gains,
        )),
    };

    let car = Car::new(car_params, controller);

    let sim = Simulation::<3>::new(sim_params).wrap_err("Invalid simulation parameters")?;

    // ---- SIMULATE ----

    let output = sim.simulate(&car).wrap_err("Simulation failed")?;

    info!("Simulated {} samples", output.len());

    // ---- ARCHIVE ----

    let mut arch =
        Archiver::from_path(&session, "car_sim.csv").wrap_err("Failed to create the archive")?;

    for (t, x) in output.t.iter().zip(output.x.iter()) {
        let u = car
            .controller
            .control(*t, x)
            .wrap_err_with(|| format!("Failed to recompute the input at t = {}", t))?;

        arch.serialise(SimRecord {
            t_s: *t,
            x1_m: x[0],
            x2_m: x[1],
            theta_rad: x[2],
            u1_ms: u[0],
            u2_rad: u[1],
        })
        .wrap_err("Failed to archive a sample")?;
    }

    arch.flush().wrap_err("Failed to flush the archive")?;

    if let Some(x_end) = output.x.last() {
        debug!("Final state: {:?}", x_end.as_slice());
    }

    info!("Archived the run to {:?}", arch.path());
    info!("End of execution");

    Ok(())
}
