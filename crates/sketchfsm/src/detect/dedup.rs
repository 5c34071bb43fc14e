//! Proximity deduplication of circle candidates.
//!
//! Hand-drawn circles produce several overlapping Hough detections; a
//! candidate is dropped when an already-accepted candidate lies within
//! `factor * candidate.radius` of its center.

use super::circles::CircleCandidate;

/// Keep the first candidate of each cluster, in input order.
///
/// Candidates are expected sorted by descending score, so the strongest
/// detection of each drawn circle survives.
pub fn dedup_candidates(candidates: Vec<CircleCandidate>, factor: f32) -> Vec<CircleCandidate> {
    let mut accepted: Vec<CircleCandidate> = Vec::new();
    for cand in candidates {
        let limit = factor * cand.radius;
        let is_duplicate = accepted.iter().any(|prev| {
            let dx = prev.x - cand.x;
            let dy = prev.y - cand.y;
            (dx * dx + dy * dy).sqrt() < limit
        });
        if !is_duplicate {
            accepted.push(cand);
        }
    }
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(x: f32, y: f32, radius: f32) -> CircleCandidate {
        CircleCandidate {
            x,
            y,
            radius,
            score: 1.0,
        }
    }

    #[test]
    fn nearby_detection_is_merged() {
        // Distance ~11.2 px, far below 2.5 * 40.
        let kept = dedup_candidates(vec![cand(100.0, 100.0, 40.0), cand(110.0, 105.0, 40.0)], 2.5);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].x, 100.0);
    }

    #[test]
    fn well_separated_detections_survive() {
        let kept = dedup_candidates(vec![cand(100.0, 100.0, 40.0), cand(400.0, 100.0, 40.0)], 2.5);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn accepted_pairs_respect_candidate_radius_separation() {
        let input: Vec<CircleCandidate> = (0..10)
            .flat_map(|i| {
                let base = i as f32 * 55.0;
                [cand(base, base, 30.0), cand(base + 20.0, base, 30.0)]
            })
            .collect();
        let kept = dedup_candidates(input, 2.5);
        for (i, a) in kept.iter().enumerate() {
            for b in kept.iter().skip(i + 1) {
                let dist = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                // The later-accepted candidate's radius set the merge limit.
                assert!(dist >= 2.5 * b.radius, "{dist} vs {}", 2.5 * b.radius);
            }
        }
    }
}
