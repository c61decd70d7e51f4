//! Visiting order for multi-site missions.

use cm_core::Coordinates;

/// Round-trip length: `start` → every site in order → back to `start`.
pub fn tour_distance(start: Coordinates, sites: &[Coordinates]) -> f64 {
    let mut total = 0.0;
    let mut at = start;
    for &site in sites {
        total += at.distance_km(site);
        at = site;
    }
    total + at.distance_km(start)
}

/// Greedy nearest-neighbour sequence from `start`.  On equal distances the
/// site listed first wins.
pub fn nearest_neighbour_order(start: Coordinates, sites: &[Coordinates]) -> Vec<Coordinates> {
    let mut remaining: Vec<Coordinates> = sites.to_vec();
    let mut ordered = Vec::with_capacity(sites.len());
    let mut at = start;
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_d = at.distance_km(remaining[0]);
        for (i, &site) in remaining.iter().enumerate().skip(1) {
            let d = at.distance_km(site);
            if d < best_d {
                best = i;
                best_d = d;
            }
        }
        at = remaining.remove(best);
        ordered.push(at);
    }
    ordered
}

/// The shorter round trip of the given order and the nearest-neighbour
/// order.  The given order is kept unless the reordering is strictly shorter.
pub fn order_sites(start: Coordinates, sites: &[Coordinates]) -> Vec<Coordinates> {
    let reordered = nearest_neighbour_order(start, sites);
    if tour_distance(start, &reordered) < tour_distance(start, sites) {
        reordered
    } else {
        sites.to_vec()
    }
}
