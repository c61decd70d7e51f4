//! Unit tests for cm-route.

use cm_core::{Coordinates, SettlementId, Tick};

use crate::{Route, RouteError, TravelStatus};

// ── Helpers ───────────────────────────────────────────────────────────────────

const HOME: Coordinates = Coordinates { lat: 0.0, lon: 0.0 };

fn at(lat: f64, lon: f64) -> Coordinates {
    Coordinates::new(lat, lon)
}

/// Home → site → home.
fn round_trip() -> Route {
    let mut r = Route::new(HOME, Some(SettlementId(0)), "home");
    r.add_navpoint(at(0.0, 1.0), None, "field site");
    r.add_navpoint(HOME, Some(SettlementId(0)), "home");
    r
}

#[cfg(test)]
mod navpoints {
    use super::*;

    #[test]
    fn distance_fixed_from_previous() {
        let r = round_trip();
        let leg = HOME.distance_km(at(0.0, 1.0));
        assert_eq!(r.points()[0].distance_km(), 0.0);
        assert!((r.points()[1].distance_km() - leg).abs() < 1e-9);
        assert!((r.points()[2].distance_km() - leg).abs() < 1e-9);
        assert!(r.points()[2].is_base());
        assert!(!r.points()[1].is_base());
    }
}

#[cfg(test)]
mod travel {
    use super::*;

    #[test]
    fn cursor_walks_forward() {
        let mut r = round_trip();
        assert_eq!(r.current_navpoint().unwrap().description(), "home");
        assert_eq!(r.next_index(), 1);

        let p = r.start_travel_to_next_node(Tick(5)).unwrap();
        assert_eq!(p.description(), "field site");
        assert_eq!(r.status(), TravelStatus::Travelling);
        assert_eq!(r.leg_start(), Tick(5));
        assert!(r.current_navpoint().is_none());

        r.reached_next_node().unwrap();
        assert_eq!(r.cursor(), 1);
        assert_eq!(r.last_stop().description(), "field site");
        assert_eq!(r.next_navpoint().unwrap().description(), "home");
    }

    #[test]
    fn cursor_never_decreases() {
        let mut r = round_trip();
        let mut seen = vec![r.cursor()];
        for _ in 0..5 {
            let _ = r.start_travel_to_next_node(Tick(0));
            seen.push(r.cursor());
            let _ = r.reached_next_node();
            seen.push(r.cursor());
        }
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert!(r.is_exhausted());
    }

    #[test]
    fn protocol_errors() {
        let mut r = round_trip();
        assert_eq!(r.reached_next_node().unwrap_err(), RouteError::NotTravelling);
        r.start_travel_to_next_node(Tick(0)).unwrap();
        assert_eq!(
            r.start_travel_to_next_node(Tick(0)).unwrap_err(),
            RouteError::AlreadyTravelling(1)
        );
        r.reached_next_node().unwrap();
        r.start_travel_to_next_node(Tick(0)).unwrap();
        r.reached_next_node().unwrap();
        assert!(matches!(
            r.start_travel_to_next_node(Tick(0)),
            Err(RouteError::Exhausted { cursor: 2, len: 3 })
        ));
    }
}

#[cfg(test)]
mod distances {
    use super::*;

    #[test]
    fn total_is_leg_plus_later_legs() {
        let mut r = round_trip();
        let leg = HOME.distance_km(at(0.0, 1.0));
        assert!((r.total_remaining_km(HOME) - 2.0 * leg).abs() < 1e-9);

        r.start_travel_to_next_node(Tick(0)).unwrap();
        let midway = at(0.0, 0.5);
        let expected = midway.distance_km(at(0.0, 1.0)) + leg;
        assert!((r.leg_remaining_km(midway) - midway.distance_km(at(0.0, 1.0))).abs() < 1e-9);
        assert!((r.total_remaining_km(midway) - expected).abs() < 1e-9);
    }

    #[test]
    fn exhausted_route_falls_back_to_final_point() {
        let mut r = round_trip();
        for _ in 0..2 {
            r.start_travel_to_next_node(Tick(0)).unwrap();
            r.reached_next_node().unwrap();
        }
        assert_eq!(r.leg_remaining_km(HOME), 0.0);
        assert_eq!(r.total_remaining_km(HOME), 0.0);
        // Drifted off the final point: distance back to it.
        assert!(r.leg_remaining_km(at(0.0, 0.1)) > 0.0);
    }
}

#[cfg(test)]
mod emergency {
    use super::*;

    #[test]
    fn reroute_while_travelling_replaces_current_leg() {
        let mut r = round_trip();
        r.start_travel_to_next_node(Tick(0)).unwrap();
        let cursor = r.cursor();
        let refuge = at(0.3, 0.2);
        r.insert_emergency_destination(refuge, Some(SettlementId(1)), "emergency destination");
        assert_eq!(r.cursor(), cursor);
        assert_eq!(r.len(), 2);
        assert!(r.is_rerouted());
        assert_eq!(r.next_navpoint().unwrap().settlement(), Some(SettlementId(1)));
        r.reached_next_node().unwrap();
        assert_eq!(r.current_navpoint().unwrap().description(), "emergency destination");
    }

    #[test]
    fn reroute_at_site_keeps_current_point() {
        let mut r = round_trip();
        r.start_travel_to_next_node(Tick(0)).unwrap();
        r.reached_next_node().unwrap();
        r.insert_emergency_destination(at(0.0, 2.0), Some(SettlementId(1)), "emergency destination");
        assert_eq!(r.len(), 3);
        assert_eq!(r.current_navpoint().unwrap().description(), "field site");
        let p = &r.points()[2];
        assert!((p.distance_km() - at(0.0, 1.0).distance_km(at(0.0, 2.0))).abs() < 1e-9);
    }

    #[test]
    fn clear_remaining_when_parked() {
        let mut r = round_trip();
        r.clear_remaining_navpoints();
        assert_eq!(r.len(), 1);
        assert!(r.is_exhausted());
    }
}

#[cfg(test)]
mod ordering {
    use super::*;
    use crate::{nearest_neighbour_order, order_sites, tour_distance};

    #[test]
    fn tour_includes_return_leg() {
        let d = tour_distance(HOME, &[at(0.0, 1.0)]);
        assert!((d - 2.0 * HOME.distance_km(at(0.0, 1.0))).abs() < 1e-9);
        assert_eq!(tour_distance(HOME, &[]), 0.0);
    }

    #[test]
    fn zigzag_gets_reordered() {
        let sites = [at(0.0, 3.0), at(0.0, 1.0), at(0.0, 2.0)];
        let ordered = order_sites(HOME, &sites);
        assert_eq!(ordered, vec![at(0.0, 1.0), at(0.0, 2.0), at(0.0, 3.0)]);
    }

    #[test]
    fn equal_distance_keeps_input_order() {
        let sites = [at(0.0, 1.0), at(0.0, -1.0)];
        assert_eq!(nearest_neighbour_order(HOME, &sites), sites.to_vec());
        assert_eq!(order_sites(HOME, &sites), sites.to_vec());
    }

    #[test]
    fn chosen_order_never_longer_than_input() {
        // Deterministic scatter of 6 sites in a few patterns.
        for seed in 0..20u32 {
            let sites: Vec<Coordinates> = (0..6u32)
                .map(|i| {
                    let k = (seed * 31 + i * 17) % 23;
                    at((k as f64 - 11.0) * 0.3, ((k * 7) % 13) as f64 * 0.25 - 1.5)
                })
                .collect();
            let chosen = order_sites(HOME, &sites);
            assert_eq!(chosen.len(), sites.len());
            assert!(tour_distance(HOME, &chosen) <= tour_distance(HOME, &sites) + 1e-9);
        }
    }
}
