use crate::domain::models::room::LayoutItem;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Serialize, Clone)]
pub struct SpotState {
    pub number: i32,
    pub x: f64,
    pub y: f64,
    pub status: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct ObstacleState {
    pub x: f64,
    pub y: f64,
}

/// A malformed layout renders as an empty floor plan rather than failing
/// the whole session view.
pub fn parse_layout(layout_json: &str) -> Vec<LayoutItem> {
    serde_json::from_str(layout_json).unwrap_or_default()
}

pub fn layout_has_spot(layout: &[LayoutItem], number: i32) -> bool {
    layout.iter().any(|item| matches!(item, LayoutItem::Spot { number: n, .. } if *n == number))
}

/// Spot occupancy is derived at read time by cross-referencing the active
/// bookings' spot numbers against the room layout.
pub fn spot_states(layout: &[LayoutItem], occupied: &HashSet<i32>) -> (Vec<SpotState>, Vec<ObstacleState>) {
    let mut spots = Vec::new();
    let mut obstacles = Vec::new();
    for item in layout {
        match item {
            LayoutItem::Spot { number, x, y } => spots.push(SpotState {
                number: *number,
                x: *x,
                y: *y,
                status: if occupied.contains(number) { "occupied" } else { "available" }.to_string(),
            }),
            LayoutItem::Obstacle { x, y } => obstacles.push(ObstacleState { x: *x, y: *y }),
        }
    }
    (spots, obstacles)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &str = r#"[
        {"type": "spot", "number": 1, "x": 0.0, "y": 0.0},
        {"type": "spot", "number": 2, "x": 1.0, "y": 0.0},
        {"type": "obstacle", "x": 2.0, "y": 2.0}
    ]"#;

    #[test]
    fn occupancy_is_cross_referenced() {
        let layout = parse_layout(LAYOUT);
        let occupied: HashSet<i32> = [2].into_iter().collect();
        let (spots, obstacles) = spot_states(&layout, &occupied);
        assert_eq!(spots.len(), 2);
        assert_eq!(spots[0].status, "available");
        assert_eq!(spots[1].status, "occupied");
        assert_eq!(obstacles.len(), 1);
    }

    #[test]
    fn unknown_spot_number_is_not_in_layout() {
        let layout = parse_layout(LAYOUT);
        assert!(layout_has_spot(&layout, 1));
        assert!(!layout_has_spot(&layout, 9));
    }

    #[test]
    fn malformed_layout_parses_empty() {
        assert!(parse_layout("not json").is_empty());
    }
}
