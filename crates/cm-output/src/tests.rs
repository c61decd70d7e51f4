//! Writer and observer tests for cm-output.

use tempfile::TempDir;

use crate::row::{MissionEventRow, MissionSummaryRow};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn tmp() -> TempDir {
    tempfile::tempdir().expect("create temp dir")
}

fn event_row(mission_id: u32, tick: u64, kind: &'static str) -> MissionEventRow {
    MissionEventRow {
        mission_id,
        tick,
        millisols: tick as f64 * 10.0,
        kind,
        detail: format!("detail {tick}"),
    }
}

fn summary_row(mission_id: u32, vehicle: Option<u32>) -> MissionSummaryRow {
    MissionSummaryRow {
        mission_id,
        mission_type:  "field study",
        lead:          3,
        members:       2,
        vehicle,
        created_tick:  Some(0),
        started_tick:  vehicle.map(|_| 1),
        finished_tick: Some(40),
        statuses:      "medical emergency; not enough resources".to_owned(),
        category:      "member",
        success:       false,
    }
}

// ── CSV tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use super::*;
    use crate::csv::CsvWriter;
    use crate::writer::OutputWriter;

    #[test]
    fn csv_files_created() {
        let dir = tmp();
        let _w = CsvWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("mission_events.csv").exists());
        assert!(dir.path().join("mission_summaries.csv").exists());
    }

    #[test]
    fn csv_headers_correct() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("mission_events.csv")).unwrap();
        let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers, ["mission_id", "tick", "millisols", "kind", "detail"]);

        let mut rdr2 = csv::Reader::from_path(dir.path().join("mission_summaries.csv")).unwrap();
        let headers2: Vec<_> = rdr2.headers().unwrap().iter().map(str::to_owned).collect();
        assert_eq!(headers2.len(), 11);
        assert_eq!(headers2[0], "mission_id");
        assert_eq!(headers2[8], "statuses");
    }

    #[test]
    fn csv_events_written_in_order() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_events(&[event_row(0, 1, "phase_changed"), event_row(0, 2, "distance_changed")]).unwrap();
        w.write_events(&[event_row(1, 2, "status_changed")]).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("mission_events.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][3], "phase_changed");
        assert_eq!(&rows[1][2], "20");
        assert_eq!(&rows[2][0], "1");
        assert_eq!(&rows[2][4], "detail 2");
    }

    #[test]
    fn csv_summary_missing_values_are_empty() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_summary(&summary_row(4, None)).unwrap();
        w.finish().unwrap();

        let mut rdr = csv::Reader::from_path(dir.path().join("mission_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "4");
        assert_eq!(&rows[0][4], ""); // vehicle
        assert_eq!(&rows[0][6], ""); // started_tick
        assert_eq!(&rows[0][8], "medical emergency; not enough resources");
        assert_eq!(&rows[0][10], "0");
    }

    #[test]
    fn csv_finish_idempotent() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
    }

    #[test]
    fn csv_empty_batch_ok() {
        let dir = tmp();
        let mut w = CsvWriter::new(dir.path()).unwrap();
        w.write_events(&[]).unwrap();
    }
}

// ── Observer ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;
    use cm_core::{Coordinates, MissionId, Resource, Science, SimConfig};
    use cm_mission::missions;
    use cm_sim::SimBuilder;
    use cm_world::{ColonyWorldBuilder, Person, SolarModel, VehicleSpec};

    use crate::csv::CsvWriter;
    use crate::observer::MissionOutputObserver;

    const HOME: Coordinates = Coordinates { lat: 0.0, lon: 0.0 };

    #[test]
    fn integration_csv() {
        let mut b = ColonyWorldBuilder::new();
        let base = b.add_settlement("Base", HOME);
        for (r, amount) in [
            (Resource::Oxygen, 500.0),
            (Resource::Water, 2_000.0),
            (Resource::Food, 500.0),
            (Resource::Methane, 2_000.0),
            (Resource::EvaSuit, 20.0),
            (Resource::SparePart, 20.0),
        ] {
            b.stock(base, r, amount);
        }
        b.add_vehicle("Rover 1", base, VehicleSpec::rover());
        let lead = b.add_person(Person::new("Ada", base, HOME).with_study(Science::Areology));
        let crew = b.add_person(Person::new("Grace", base, HOME));
        // Nobody with a study: fails at once.
        let idle = b.add_person(Person::new("Mae", base, HOME));
        b.solar(SolarModel::constant(400.0));
        let world = b.build().unwrap();

        let config = SimConfig {
            millisols_per_tick:    10.0,
            total_ticks:           2_000,
            seed:                  1,
            output_interval_ticks: 0,
        };
        let mut sim = SimBuilder::new(config.clone(), world).build().unwrap();
        sim.propose(|id, ctx, rng| missions::field_study(id, lead, &[crew], ctx, rng)).unwrap();
        sim.propose(|id, ctx, rng| missions::field_study(id, idle, &[], ctx, rng)).unwrap();

        let dir = tmp();
        let writer = CsvWriter::new(dir.path()).unwrap();
        let mut obs = MissionOutputObserver::new(writer, &config);
        sim.run(&mut obs).unwrap();
        assert!(obs.take_error().is_none(), "no write errors expected");
        assert!(sim.is_idle());

        let mut rdr = csv::Reader::from_path(dir.path().join("mission_summaries.csv")).unwrap();
        let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        // The failed proposal retires on the first tick, before the study ends.
        assert_eq!(&rows[0][0], MissionId(1).0.to_string().as_str());
        assert_eq!(&rows[0][8], "no research study");
        assert_eq!(&rows[0][9], "setup");
        assert_eq!(&rows[1][8], "accomplished");
        assert_eq!(&rows[1][10], "1");

        let mut rdr = csv::Reader::from_path(dir.path().join("mission_events.csv")).unwrap();
        let events: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
        let ticks: Vec<u64> = events.iter().map(|r| r[1].parse().unwrap()).collect();
        assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
        assert!(events.iter().any(|r| &r[3] == "phase_changed"));
        let last = events.iter().filter(|r| &r[0] == "0").last().unwrap();
        assert_eq!(&last[3], "status_changed");
        assert_eq!(&last[4], "accomplished");
    }
}

// ── SQLite tests ──────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use super::*;
    use crate::sqlite::SqliteWriter;
    use crate::writer::OutputWriter;

    #[test]
    fn sqlite_db_created() {
        let dir = tmp();
        let _w = SqliteWriter::new(dir.path()).unwrap();
        assert!(dir.path().join("output.db").exists());
    }

    #[test]
    fn sqlite_event_count() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_events(&[
            event_row(0, 1, "phase_changed"),
            event_row(0, 2, "phase_changed"),
            event_row(1, 2, "roster_changed"),
        ])
        .unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM mission_events WHERE kind = 'phase_changed'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn sqlite_missing_vehicle_is_null() {
        let dir = tmp();
        let mut w = SqliteWriter::new(dir.path()).unwrap();
        w.write_summary(&summary_row(2, None)).unwrap();
        w.write_summary(&summary_row(3, Some(7))).unwrap();
        w.finish().unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("output.db")).unwrap();
        let vehicle: Option<i64> = conn
            .query_row("SELECT vehicle FROM mission_summaries WHERE mission_id = 2", [], |r| r.get(0))
            .unwrap();
        assert_eq!(vehicle, None);
        let (vehicle, started): (Option<i64>, Option<i64>) = conn
            .query_row(
                "SELECT vehicle, started_tick FROM mission_summaries WHERE mission_id = 3",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!((vehicle, started), (Some(7), Some(1)));
    }
}
