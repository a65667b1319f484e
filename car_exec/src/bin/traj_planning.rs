//! # Trajectory Planning
//!
//! Samples the transition planners over their interval and archives the
//! samples as CSV files in the session directory. Without arguments the four
//! reference planners (polynomial, prototype and Gevrey with `s = 1.1` and
//! `s = 1.9`) plan the transition from `[0, 0, 0]` to `[1, 0, 0]` over
//! `[0, 1]`. A planner parameter file can be given to sample a single custom
//! planner instead.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use car_lib::planner::{BoundaryPolicy, Planner, PlannerKind, PlannerParams};
use color_eyre::{eyre::WrapErr, Result};
use log::info;
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
#[structopt(name = "traj_planning", about = "Sample and archive transition trajectories")]
struct Opts {
    /// Planner parameter file, relative to the params directory
    #[structopt(short, long)]
    params: Option<String>,

    /// Number of samples over the transition interval
    #[structopt(short, long, default_value = "100")]
    samples: usize,

    /// Time before and after the interval to also sample
    ///
    /// Units: seconds
    #[structopt(long, default_value = "0.0")]
    margin_s: f64,
}

// ------------------------------------------------------------------------------------------------
// MAIN
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opts = Opts::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("traj_planning", "sessions").wrap_err("Failed to create the session")?;

    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    info!("Trajectory Planning\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let planners: Vec<(String, PlannerParams)> = match opts.params {
        Some(ref path) => {
            let params: PlannerParams =
                util::params::load(path).wrap_err("Could not load planner params")?;
            vec![("custom".into(), params)]
        }
        None => reference_planners(),
    };

    session
        .save_json(
            "planners.json",
            &planners.iter().map(|(_, p)| p).collect::<Vec<_>>(),
        )
        .wrap_err("Failed to save the planner parameters")?;

    // ---- SAMPLE AND ARCHIVE ----

    for (name, params) in planners.iter() {
        let planner = params
            .build()
            .wrap_err_with(|| format!("Failed to build the {} planner", name))?;

        if !planner.warnings().is_empty() {
            info!(
                "The {} planner raised {} warning(s) during construction",
                name,
                planner.warnings().len()
            );
        }

        let times = linspace(
            params.t0 - opts.margin_s,
            params.tf + opts.margin_s,
            opts.samples,
        );

        archive_samples(&session, name, planner.as_ref(), &times)
            .wrap_err_with(|| format!("Failed to archive the {} planner", name))?;

        info!("Archived {} samples of the {} planner", times.len(), name);
    }

    info!("End of execution");

    Ok(())
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The planners of the reference transition.
fn reference_planners() -> Vec<(String, PlannerParams)> {
    let base = |kind: PlannerKind| PlannerParams {
        kind,
        order: 2,
        t0: 0.0,
        tf: 1.0,
        ya: vec![0.0, 0.0, 0.0],
        yb: vec![1.0, 0.0, 0.0],
        policy: BoundaryPolicy::Relaxed,
    };

    vec![
        ("polynomial".into(), base(PlannerKind::Polynomial)),
        ("prototype".into(), base(PlannerKind::Prototype)),
        ("gevrey_1.1".into(), base(PlannerKind::Gevrey { s: 1.1 })),
        ("gevrey_1.9".into(), base(PlannerKind::Gevrey { s: 1.9 })),
    ]
}

/// Evaluate the planner at all times and write one row per sample.
fn archive_samples(
    session: &Session,
    name: &str,
    planner: &dyn Planner,
    times: &[f64],
) -> Result<()> {
    let samples = planner.eval_vec(times)?;

    let mut arch = Archiver::from_path(session, format!("{}.csv", name))?;

    let mut header = vec!["t_s".to_string()];
    header.extend((0..samples.ncols()).map(|i| format!("y_{}", i)));
    arch.write_record(&header)?;

    for (t, row) in times.iter().zip(samples.row_iter()) {
        let mut record = vec![t.to_string()];
        record.extend(row.iter().map(|v| v.to_string()));
        arch.write_record(&record)?;
    }

    arch.flush()?;

    Ok(())
}

/// `num` evenly spaced values from `start` to `end` inclusive.
fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| start + i as f64 * step).collect()
        }
    }
}
