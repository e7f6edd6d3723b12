//! A property directed reachability (PDR/IC3) engine for grounded STRIPS
//! planning.
//!
//! marten_pdr decides whether a goal condition is reachable in a grounded
//! planning problem and, if so, emits a plan. The engine maintains an
//! inductive sequence of layers --- over-approximations of the states which
//! reach the goal within a step bound --- refined by blocking clauses derived
//! from failed extension attempts, in the style hardware model checkers
//! made familiar.
//!
//! # Orientation
//!
//! A run is built around a [SolveContext](context::SolveContext), owner of
//! every mutable part of the search. A [Problem](structures::problem::Problem)
//! --- read from the grounded text format by [builder], or assembled directly ---
//! is normalized, viewed through a direction-aware
//! [Model](structures::problem::Model), optionally strengthened by the
//! [invariant] engine, and solved:
//!
//! ```rust
//! # use marten_pdr::builder::read_strips;
//! # use marten_pdr::config::Config;
//! # use marten_pdr::context::SolveContext;
//! # use marten_pdr::invariant;
//! # use marten_pdr::reports::Report;
//! # use marten_pdr::structures::problem::Model;
//! let text = "\
//! p strips 2 1
//! i 1 0
//! g 2 0
//! a step : 1 0 2 0 0
//! ";
//! let mut problem = read_strips(text.as_bytes()).unwrap();
//! problem.normalize();
//!
//! let config = Config::default();
//! let model = Model::build(&problem, config.reverse.value);
//!
//! let mut ctx = SolveContext::new(model, config);
//! ctx.load_invariant(invariant::derive(&ctx.model).collect_set());
//!
//! assert_eq!(ctx.solve(), Report::PlanFound(1));
//! ```
//!
//! Useful starting points:
//! - The [solve procedure](crate::procedures::solve) for the phase loop.
//! - The [layer store](crate::db::layers) for the clause data the loop
//!   refines.
//! - The [extension oracle](crate::procedures::extend) for where the work
//!   happens.
//! - The [configuration](crate::config) for the feature switches.
//!
//! # Logs
//!
//! Log calls are made throughout with the targets listed in [misc::log];
//! no implementation is provided.

pub mod builder;
pub mod config;
pub mod context;
pub mod db;
pub mod generic;
pub mod invariant;
pub mod misc;
pub mod procedures;
pub mod reports;
pub mod structures;
pub mod translate;
pub mod types;
