//! The fixed mystery dataset owned by the embedded engine.
//!
//! Four tables tell one connected story: archived case files, the evidence
//! recovered at each scene, the people under suspicion, and what the
//! witnesses had to say. The seed rows are load-bearing: the casebook
//! predicates search them for specific codes, times, names and signatures,
//! so the text here and the heuristics in [`crate::casebook`] must stay in
//! agreement.

use rusqlite::Connection;

use crate::error::Result;

/// The table available from the very first case.
pub const BASE_TABLE: &str = "case_files";

/// Table layout catalog used by the query builder when a whole table is
/// selected at once. Column order matches the `create table` statements.
pub const SCHEMA: &[(&str, &[&str])] = &[
    (
        "case_files",
        &["case_id", "case_title", "location", "summary", "severity"],
    ),
    (
        "evidence",
        &["evidence_id", "case_id", "item", "found_at", "note", "is_key"],
    ),
    (
        "suspects",
        &["suspect_id", "case_id", "name", "alibi", "suspicion"],
    ),
    (
        "witness_statements",
        &[
            "statement_id",
            "case_id",
            "witness",
            "reliability",
            "statement",
            "given_at",
        ],
    ),
];

pub fn columns_of(table: &str) -> Option<&'static [&'static str]> {
    SCHEMA
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(table))
        .map(|(_, columns)| *columns)
}

/// Create the schema and seed the narrative rows in one batch.
pub fn seed(connection: &Connection) -> Result<()> {
    connection.execute_batch(
        "
        create table if not exists case_files (
            case_id integer not null,
            case_title text not null,
            location text not null,
            summary text not null,
            severity integer not null,
            constraint referenceable_case_id primary key (
                case_id
            )
        );
        create table if not exists evidence (
            evidence_id integer not null,
            case_id integer not null,
            item text not null,
            found_at text not null,
            note text not null,
            is_key integer not null,
            constraint referenceable_evidence_id primary key (
                evidence_id
            ),
            constraint evidence_belongs_to_case foreign key (
                case_id
            ) references case_files(case_id)
        );
        create table if not exists suspects (
            suspect_id integer not null,
            case_id integer not null,
            name text not null,
            alibi text not null,
            suspicion integer not null,
            constraint referenceable_suspect_id primary key (
                suspect_id
            ),
            constraint suspect_belongs_to_case foreign key (
                case_id
            ) references case_files(case_id)
        );
        create table if not exists witness_statements (
            statement_id integer not null,
            case_id integer not null,
            witness text not null,
            reliability integer not null,
            statement text not null,
            given_at text not null,
            constraint referenceable_statement_id primary key (
                statement_id
            ),
            constraint statement_belongs_to_case foreign key (
                case_id
            ) references case_files(case_id)
        );

        insert into case_files (case_id, case_title, location, summary, severity) values
            (1, 'The Phantom Receipt', 'Beika',
             'A dated receipt surfaced inside a sealed archive box. On its back, in pencil: locker code B7.', 3),
            (2, 'The Locker Room', 'Beika Station',
             'Locker B7 stood open at dawn, cleared out some time before the night patrol passed.', 4),
            (3, 'The Silent Courier', 'Haido',
             'A courier bag vanished between two signed handoffs.', 2),
            (4, 'The Midnight Cargo', 'Beika Docks',
             'Three crates left the warehouse after midnight with no entry on the manifest.', 5),
            (5, 'The Borrowed Key', 'Teitan',
             'The caretaker reported a spare key missing from a locked drawer.', 1);

        insert into evidence (evidence_id, case_id, item, found_at, note, is_key) values
            (1, 2, 'claim ticket', 'locker B7 shelf',
             'Claim ticket for locker B7, made out to Goro Tanuma.', 1),
            (2, 2, 'platform clock photo', 'east platform',
             'Patrol photo of the east platform clock, hands frozen at 21:45.', 1),
            (3, 2, 'torn glove', 'under bench 4',
             'Right-hand work glove, torn at the seam.', 0),
            (4, 1, 'archive box seal', 'records room',
             'Wax seal lifted cleanly and re-pressed once.', 1),
            (5, 4, 'manifest page', 'harbor office',
             'Page 12 of the manifest, three lines inked out.', 1),
            (6, 3, 'delivery log', 'courier depot',
             'Second signature does not match the roster.', 0);

        insert into suspects (suspect_id, case_id, name, alibi, suspicion) values
            (1, 2, 'Goro Tanuma',
             'Says he was already home at 21:45, though nobody saw him arrive.', 8),
            (2, 2, 'Mika Sato',
             'Closing shift at the kiosk until the last train.', 5),
            (3, 2, 'Ren Akai',
             'Asleep in the waiting room, confirmed by the attendant.', 3),
            (4, 4, 'Daisuke Mori',
             'Night watch on the far pier.', 6);

        insert into witness_statements (statement_id, case_id, witness, reliability, statement, given_at) values
            (1, 2, 'Aya Kline', 5,
             'I saw Goro Tanuma beside the lockers right before the hall lights went out. signed: Aya Kline', '22:10'),
            (2, 2, 'Hiro Bell', 4,
             'Heard a locker door slam twice after the last announcement. signed: Hiro Bell', '21:50'),
            (3, 2, 'Tomas Iwai', 2,
             'It was probably a cat. signed: Tomas Iwai', '23:05'),
            (4, 4, 'Nana Kisaki', 3,
             'A truck idled by the gate with its lights off. signed: Nana Kisaki', '00:40');
        ",
    )?;
    Ok(())
}
