//! Drop-position geometry
//!
//! Given the pointer and the candidate cards (the dragged card excluded), find
//! the closest card and whether the dragged item goes before or after it.
//!
//! * Grid layout: Euclidean distance from the pointer to each card centre.
//! * List layout: vertical distance only.
//! * Before/after: pointer above the closest card's vertical midpoint means
//!   before; on or below it means after.
//! * Ties keep the first candidate in iteration order.
//! * No candidates means append.

use serde::{Deserialize, Serialize};

/// Pointer position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding rectangle of a rendered card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CardRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.vertical_midpoint())
    }

    pub fn vertical_midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }

    /// Half-open containment: left/top edges inside, right/bottom outside
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left
            && p.x < self.left + self.width
            && p.y >= self.top
            && p.y < self.top + self.height
    }
}

/// How the card container flows its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
}

impl LayoutMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
        }
    }
}

/// Which side of a target the dragged item lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertSide {
    Before,
    After,
}

/// Resolver output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement<T> {
    Before(T),
    After(T),
    Append,
}

impl<T: Copy> Placement<T> {
    fn at(target: T, side: InsertSide) -> Self {
        match side {
            InsertSide::Before => Self::Before(target),
            InsertSide::After => Self::After(target),
        }
    }

    pub fn target(&self) -> Option<T> {
        match self {
            Self::Before(t) | Self::After(t) => Some(*t),
            Self::Append => None,
        }
    }
}

fn distance(pointer: Point, rect: &CardRect, mode: LayoutMode) -> f64 {
    let center = rect.center();
    match mode {
        LayoutMode::Grid => {
            let dx = pointer.x - center.x;
            let dy = pointer.y - center.y;
            (dx * dx + dy * dy).sqrt()
        }
        LayoutMode::List => (pointer.y - center.y).abs(),
    }
}

fn side_of(pointer: Point, rect: &CardRect) -> InsertSide {
    if pointer.y < rect.vertical_midpoint() {
        InsertSide::Before
    } else {
        InsertSide::After
    }
}

/// Find the closest candidate and the side to insert on
pub fn resolve<T: Copy>(pointer: Point, candidates: &[(T, CardRect)], mode: LayoutMode) -> Placement<T> {
    let mut closest: Option<(T, &CardRect, f64)> = None;

    for (id, rect) in candidates {
        let d = distance(pointer, rect, mode);
        if closest.map_or(true, |(_, _, best)| d < best) {
            closest = Some((*id, rect, d));
        }
    }

    match closest {
        Some((id, rect, _)) => Placement::at(id, side_of(pointer, rect)),
        None => Placement::Append,
    }
}

/// Apply a placement to an id sequence. The dragged id is removed and
/// reinserted; a target that is missing (or is the dragged id itself) appends.
/// Returns true if the order changed.
pub fn apply_placement<T: Copy + PartialEq>(order: &mut Vec<T>, dragged: T, placement: Placement<T>) -> bool {
    let before = order.clone();
    order.retain(|id| *id != dragged);

    let index = match placement {
        Placement::Before(target) if target != dragged => order.iter().position(|id| *id == target),
        Placement::After(target) if target != dragged => {
            order.iter().position(|id| *id == target).map(|i| i + 1)
        }
        _ => None,
    };

    match index {
        Some(i) => order.insert(i, dragged),
        None => order.push(dragged),
    }

    *order != before
}

/// First rect containing the pointer
pub fn hit_test<T: Copy>(pointer: Point, rects: &[(T, CardRect)]) -> Option<T> {
    rects
        .iter()
        .find(|(_, rect)| rect.contains(pointer))
        .map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Three cards stacked vertically, 4 units tall
    fn column() -> Vec<(u32, CardRect)> {
        vec![
            (1, CardRect::new(0.0, 0.0, 20.0, 4.0)),
            (2, CardRect::new(0.0, 4.0, 20.0, 4.0)),
            (3, CardRect::new(0.0, 8.0, 20.0, 4.0)),
        ]
    }

    #[test]
    fn test_no_candidates_appends() {
        let none: Vec<(u32, CardRect)> = Vec::new();
        assert_eq!(resolve(Point::new(5.0, 5.0), &none, LayoutMode::Grid), Placement::Append);
        assert_eq!(resolve(Point::new(5.0, 5.0), &none, LayoutMode::List), Placement::Append);
    }

    #[test]
    fn test_list_above_midpoint_is_before() {
        let placement = resolve(Point::new(3.0, 4.5), &column(), LayoutMode::List);
        assert_eq!(placement, Placement::Before(2));
    }

    #[test]
    fn test_list_below_midpoint_is_after() {
        let placement = resolve(Point::new(3.0, 7.0), &column(), LayoutMode::List);
        assert_eq!(placement, Placement::After(2));
    }

    #[test]
    fn test_exact_midpoint_counts_as_after() {
        let placement = resolve(Point::new(3.0, 6.0), &column(), LayoutMode::List);
        assert_eq!(placement, Placement::After(2));
    }

    #[test]
    fn test_list_ignores_horizontal_distance() {
        let cards = vec![
            (1, CardRect::new(0.0, 0.0, 10.0, 4.0)),
            (2, CardRect::new(100.0, 4.0, 10.0, 4.0)),
        ];
        let placement = resolve(Point::new(0.0, 5.5), &cards, LayoutMode::List);
        assert_eq!(placement.target(), Some(2));
    }

    #[test]
    fn test_grid_uses_euclidean_distance() {
        // Two cards on the same row; pointer sits over the right one
        let cards = vec![
            (1, CardRect::new(0.0, 0.0, 10.0, 4.0)),
            (2, CardRect::new(12.0, 0.0, 10.0, 4.0)),
        ];
        let placement = resolve(Point::new(18.0, 1.0), &cards, LayoutMode::Grid);
        assert_eq!(placement, Placement::Before(2));

        // The same pointer in list mode ties on vertical distance, first wins
        let placement = resolve(Point::new(18.0, 1.0), &cards, LayoutMode::List);
        assert_eq!(placement, Placement::Before(1));
    }

    #[test]
    fn test_side_is_decided_by_closest_card_only() {
        // Pointer below the midpoint of the closest card but above the
        // midpoint of a later, farther card.
        let cards = vec![
            (1, CardRect::new(0.0, 0.0, 10.0, 4.0)),
            (2, CardRect::new(30.0, 0.0, 10.0, 20.0)),
        ];
        let placement = resolve(Point::new(5.0, 3.0), &cards, LayoutMode::Grid);
        assert_eq!(placement, Placement::After(1));
    }

    #[test]
    fn test_ties_keep_first_candidate() {
        let cards = vec![
            (7, CardRect::new(0.0, 0.0, 10.0, 4.0)),
            (8, CardRect::new(20.0, 0.0, 10.0, 4.0)),
        ];
        // Equidistant from both centres
        let p = Point::new(15.0, 2.0);
        assert_eq!(resolve(p, &cards, LayoutMode::Grid).target(), Some(7));
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let cards = column();
        let p = Point::new(2.5, 9.25);
        let first = resolve(p, &cards, LayoutMode::Grid);
        for _ in 0..10 {
            assert_eq!(resolve(p, &cards, LayoutMode::Grid), first);
        }
    }

    #[test]
    fn test_pointer_past_end_resolves_after_last() {
        let placement = resolve(Point::new(3.0, 50.0), &column(), LayoutMode::List);
        assert_eq!(placement, Placement::After(3));
    }

    #[test]
    fn test_apply_before_moves_to_front() {
        let mut order = vec![1, 2, 3];
        assert!(apply_placement(&mut order, 3, Placement::Before(1)));
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn test_apply_after_moves_to_back() {
        let mut order = vec![1, 2, 3];
        assert!(apply_placement(&mut order, 1, Placement::After(3)));
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_apply_same_slot_reports_unchanged() {
        let mut order = vec![1, 2, 3];
        assert!(!apply_placement(&mut order, 2, Placement::After(1)));
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_apply_missing_target_appends() {
        let mut order = vec![1, 2, 3];
        apply_placement(&mut order, 1, Placement::Before(42));
        assert_eq!(order, vec![2, 3, 1]);
    }

    #[test]
    fn test_apply_append() {
        let mut order = vec![1];
        assert!(!apply_placement(&mut order, 1, Placement::Append));
        assert_eq!(order, vec![1]);
    }

    #[test]
    fn test_hit_test_half_open_edges() {
        let cards = column();
        assert_eq!(hit_test(Point::new(0.0, 0.0), &cards), Some(1));
        assert_eq!(hit_test(Point::new(19.9, 3.9), &cards), Some(1));
        assert_eq!(hit_test(Point::new(5.0, 4.0), &cards), Some(2));
        assert_eq!(hit_test(Point::new(20.0, 1.0), &cards), None);
        assert_eq!(hit_test(Point::new(5.0, 12.0), &cards), None);
    }

    #[test]
    fn test_layout_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LayoutMode::List).unwrap(), "\"list\"");
        let mode: LayoutMode = serde_json::from_str("\"grid\"").unwrap();
        assert_eq!(mode, LayoutMode::Grid);
    }
}
