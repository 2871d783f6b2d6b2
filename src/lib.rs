//! Sleuth – the engine of a narrative SQL-teaching game.
//!
//! A fixed mystery dataset lives inside an embedded SQL engine; the player
//! interrogates it with hand-written or visually built queries, and a chain
//! of ten cases judges the results, each case unlocking the next. The pieces:
//!
//! * A [`gateway::Gateway`] forwards raw SQL verbatim to the engine and
//!   normalizes rows and errors. No SQL is parsed in this crate.
//! * The [`progression::Progression`] state machine validates query results
//!   against the active case's heuristics, carries extracted values (codes,
//!   times, names) forward between cases, and persists its cursor.
//! * The [`casebook`] holds the ten static case definitions and their
//!   predicate functions.
//! * A [`builder::QueryModel`] mirrors the visual query builder and compiles
//!   to SQL text as a pure function of the model.
//! * The [`history::History`] ledger is the "evidence board": every executed
//!   query, deduplicated, with its full result payload.
//! * [`onboarding::Onboarding`] scripts the first-case tutorial.
//! * [`storage::SlotStore`] is the local-storage analog: three named slots of
//!   whole-blob JSON documents, where absence or corruption means "empty".
//! * A [`session::Session`] wires it all together and notifies registered
//!   listeners on state changes.
//!
//! ## Quick Start
//! ```
//! use sleuth::session::Session;
//! use sleuth::storage::MemorySlots;
//! let mut session = Session::open(MemorySlots::new()).unwrap();
//! let report = session
//!     .run_query("select * from case_files where case_id = 1")
//!     .unwrap();
//! assert!(report.outcome.map(|outcome| outcome.is_solved()).unwrap_or(false));
//! assert_eq!(session.completed_cases(), vec![1]);
//! ```
//!
//! ## Concurrency
//! There is none: everything runs synchronously inside the caller's event
//! loop, mirroring the single-document execution model this design targets.
//! The slot store sits behind `Arc<Mutex<..>>` purely so the services can
//! share one handle.

pub mod builder;
pub mod casebook;
pub mod dataset;
pub mod error;
pub mod gateway;
pub mod history;
pub mod onboarding;
pub mod progression;
pub mod session;
pub mod settings;
pub mod storage;
