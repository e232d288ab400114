#![warn(missing_docs)]

//! # `edgelink`
//!
//! A solver for weighted-edge logic puzzles such as Jane Street's [Bug Byte](https://www.janestreet.com/puzzles/bug-byte-index/).
//! Such a puzzle gives a fixed graph whose edge weights are hidden, a handful of rules those weights obey, and asks for
//! the word spelled by the shortest path between two vertices once every weight is known.
//!
//! Begin by building a puzzle with a [`PuzzleBuilder`](builder::PuzzleBuilder), or take the built-in one from [`bug_byte()`].
//! Then call [`solve()`](crate::Puzzle::solve), consuming the puzzle and yielding the weighted graph and the answer.
//! Graphs are undirected by default; the `Ty` parameter accepts [`petgraph::Directed`] as well.
//!
//! # Internals
//! Solving happens in three stages.
//!
//! 1. The [`encoder`] turns graph and rules into a [`ConstraintModel`](model::ConstraintModel): one integer variable
//! per edge, plus linear constraints for every rule. A rule such as "some path leaving V sums to T" becomes one
//! conditional sum per candidate path and a disjunction over them.
//! 2. The [`Driver`](solver::Driver) hands the model to a [`ConstraintEngine`](engine::ConstraintEngine), by default the
//! [`SatEngine`](engine::SatEngine) which expresses it as a Boolean satisfiability problem for [`varisat`].
//! It then searches again with the first answer forbidden, so a puzzle is only reported solved when its weights are unique.
//! 3. With all weights written back onto the graph, the [`path`] module finds the lightest path (ties go to the
//! lexicographically smallest vertex sequence) and maps its weights to characters.
//!
//! Every stage fails with its own error type from [`error`]; [`PipelineError`](error::PipelineError) says which stage gave up.

pub use builder::PuzzleBuilder;
pub use config::SolveConfig;
pub use graph::{EdgeId, PuzzleGraph, VertexId, Weight};
pub use puzzle::{bug_byte, Puzzle, SolvedPuzzle};
pub use rules::{Rule, RuleSet};

pub mod builder;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod graph;
pub mod log;
pub(crate) mod logic;
pub mod model;
pub mod path;
pub mod puzzle;
pub mod rules;
pub mod solver;
