// Author: Eshan Roy
// SPDX-License-Identifier: MIT

//! Rule engine module.
//!
//! A [`RuleSet`] names the tests a [`Value`] must pass; the [`Approver`]
//! dispatches each rule to its test and collects the outcome into an
//! [`EvaluationResult`].

mod engine;
mod params;
mod result;
mod ruleset;
mod value;

pub use engine::Approver;
pub use params::Params;
pub use result::{EvaluationResult, RuleOutcome};
pub use ruleset::{Constraint, RuleSet, RESERVED_KEYS};
pub use value::Value;

pub(crate) use params::string_list;
