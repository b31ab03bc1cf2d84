//! List and count query construction.
//!
//! Query-string filters are turned into a fixed-order list of [`Predicate`]s
//! that every store combines with logical AND. Sorting and paging are resolved
//! with lenient fallbacks: an unknown sort key orders by id, a missing or zero
//! page size uses [`DEFAULT_PAGE_SIZE`].

use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::domain::{Ship, ShipType};

/// Page size used when the client supplies none, or zero.
pub const DEFAULT_PAGE_SIZE: i64 = 3;

/// Optional filters accepted by list and count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShipFilter {
    /// Substring of the ship name (case-sensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Substring of the planet (case-sensitive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub planet: Option<String>,
    /// Exact ship class; unknown classes are ignored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ship_type: Option<String>,
    /// Earliest production date, epoch milliseconds, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<i64>,
    /// Latest production date, epoch milliseconds, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<i64>,
    /// Usage flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_used: Option<bool>,
    /// Minimum speed, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_speed: Option<f64>,
    /// Maximum speed, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
    /// Minimum crew size, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_crew_size: Option<i32>,
    /// Maximum crew size, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_crew_size: Option<i32>,
    /// Minimum rating, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    /// Maximum rating, inclusive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
}

/// Ordering and paging parameters accepted by list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Sort key: `ID`, `SPEED`, `DATE` or `RATING`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,
    /// Zero-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<i64>,
    /// Page size; zero means the default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<i64>,
}

/// Text column matched by substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextColumn {
    /// `name`
    Name,
    /// `planet`
    Planet,
}

impl TextColumn {
    fn value(self, ship: &Ship) -> &str {
        match self {
            Self::Name => &ship.name,
            Self::Planet => &ship.planet,
        }
    }
}

/// Equality condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Equality {
    /// `shipType = value`
    ShipType(ShipType),
    /// `isUsed = value`
    IsUsed(bool),
}

/// Column and bound value of a range condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Limit {
    /// Production date in epoch milliseconds.
    ProdDate(i64),
    /// Speed.
    Speed(f64),
    /// Crew size.
    CrewSize(i32),
    /// Rating.
    Rating(f64),
}

/// Which side of a range a bound closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// `column >= bound`
    Lower,
    /// `column <= bound`
    Upper,
}

impl Edge {
    /// Whether `actual` lies on the admitted side of `bound`.
    pub fn admits<T: PartialOrd>(self, actual: T, bound: T) -> bool {
        match self {
            Self::Lower => actual >= bound,
            Self::Upper => actual <= bound,
        }
    }
}

/// A single filter condition against the ship table.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-sensitive substring match.
    Contains {
        /// Column searched.
        column: TextColumn,
        /// Substring looked for.
        needle: String,
    },
    /// Equality match.
    Equals(Equality),
    /// Inclusive range bound.
    Range {
        /// Column and bound value.
        limit: Limit,
        /// Side of the range.
        edge: Edge,
    },
}

impl Predicate {
    /// Evaluate the predicate against a ship.
    pub fn matches(&self, ship: &Ship) -> bool {
        match self {
            Self::Contains { column, needle } => column.value(ship).contains(needle.as_str()),
            Self::Equals(Equality::ShipType(ship_type)) => ship.ship_type == *ship_type,
            Self::Equals(Equality::IsUsed(is_used)) => ship.is_used == *is_used,
            Self::Range { limit, edge } => match *limit {
                Limit::ProdDate(bound) => edge.admits(ship.prod_date, bound),
                Limit::Speed(bound) => edge.admits(ship.speed, bound),
                Limit::CrewSize(bound) => edge.admits(ship.crew_size, bound),
                Limit::Rating(bound) => edge.admits(ship.rating, bound),
            },
        }
    }
}

/// Whether a ship satisfies every predicate.
pub fn matches_all(predicates: &[Predicate], ship: &Ship) -> bool {
    predicates.iter().all(|predicate| predicate.matches(ship))
}

/// Translate filters into predicates, one per present filter.
pub fn build_predicates(filter: &ShipFilter) -> Vec<Predicate> {
    let mut predicates = Vec::new();

    if let Some(name) = &filter.name {
        predicates.push(Predicate::Contains {
            column: TextColumn::Name,
            needle: name.clone(),
        });
    }
    if let Some(planet) = &filter.planet {
        predicates.push(Predicate::Contains {
            column: TextColumn::Planet,
            needle: planet.clone(),
        });
    }
    if let Some(ship_type) = filter
        .ship_type
        .as_deref()
        .and_then(|value| value.parse::<ShipType>().ok())
    {
        predicates.push(Predicate::Equals(Equality::ShipType(ship_type)));
    }

    let ranges = [
        (filter.after.map(Limit::ProdDate), Edge::Lower),
        (filter.before.map(Limit::ProdDate), Edge::Upper),
        (filter.min_speed.map(Limit::Speed), Edge::Lower),
        (filter.max_speed.map(Limit::Speed), Edge::Upper),
        (filter.min_crew_size.map(Limit::CrewSize), Edge::Lower),
        (filter.max_crew_size.map(Limit::CrewSize), Edge::Upper),
        (filter.min_rating.map(Limit::Rating), Edge::Lower),
        (filter.max_rating.map(Limit::Rating), Edge::Upper),
    ];
    predicates.extend(
        ranges
            .into_iter()
            .filter_map(|(limit, edge)| limit.map(|limit| Predicate::Range { limit, edge })),
    );

    if let Some(is_used) = filter.is_used {
        predicates.push(Predicate::Equals(Equality::IsUsed(is_used)));
    }

    predicates
}

/// Column a listing is ordered by, always ascending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// `id`
    #[default]
    Id,
    /// `speed`
    Speed,
    /// `prodDate`
    ProdDate,
    /// `rating`
    Rating,
}

const SORT_KEYS: [(&str, SortKey); 4] = [
    ("ID", SortKey::Id),
    ("SPEED", SortKey::Speed),
    ("DATE", SortKey::ProdDate),
    ("RATING", SortKey::Rating),
];

impl SortKey {
    /// Look up a sort key by name, falling back to [`SortKey::Id`].
    pub fn resolve(name: Option<&str>) -> Self {
        name.and_then(|name| {
            SORT_KEYS
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, sort)| *sort)
        })
        .unwrap_or_default()
    }

    /// Wire name of the ordered field.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Speed => "speed",
            Self::ProdDate => "prodDate",
            Self::Rating => "rating",
        }
    }
}

/// A resolved page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page number.
    pub number: i64,
    /// Rows per page.
    pub size: i64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            number: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Apply defaults: page 0, size [`DEFAULT_PAGE_SIZE`] when absent or not positive.
    pub fn resolve(number: Option<i64>, size: Option<i64>) -> Self {
        Self {
            number: number.unwrap_or(0).max(0),
            size: size.filter(|size| *size > 0).unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    /// Rows skipped before the page.
    pub fn offset(&self) -> i64 {
        self.number.saturating_mul(self.size)
    }

    /// Maximum rows in the page.
    pub fn limit(&self) -> i64 {
        self.size
    }
}

/// A complete list query handed to a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShipQuery {
    /// Conditions combined with AND.
    pub predicates: Vec<Predicate>,
    /// Ascending sort column.
    pub sort: SortKey,
    /// Page window.
    pub page: PageRequest,
}

impl ShipQuery {
    /// Resolve filters and page parameters into a query.
    pub fn from_params(filter: &ShipFilter, params: &PageParams) -> Self {
        Self {
            predicates: build_predicates(filter),
            sort: SortKey::resolve(params.order.as_deref()),
            page: PageRequest::resolve(params.page_number, params.page_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(id: i64, speed: f64, is_used: bool) -> Ship {
        Ship {
            id,
            name: format!("Ship-{id}"),
            planet: "Jupiter".to_string(),
            ship_type: ShipType::Transport,
            prod_date: 0,
            is_used,
            speed,
            crew_size: 10,
            rating: 1.0,
        }
    }

    #[test]
    fn empty_filter_builds_no_predicates() {
        assert!(build_predicates(&ShipFilter::default()).is_empty());
    }

    #[test]
    fn predicates_follow_fixed_order() {
        let filter = ShipFilter {
            is_used: Some(true),
            max_rating: Some(3.0),
            name: Some("Nova".to_string()),
            after: Some(10),
            ..ShipFilter::default()
        };
        let predicates = build_predicates(&filter);

        assert_eq!(
            predicates,
            vec![
                Predicate::Contains {
                    column: TextColumn::Name,
                    needle: "Nova".to_string(),
                },
                Predicate::Range {
                    limit: Limit::ProdDate(10),
                    edge: Edge::Lower,
                },
                Predicate::Range {
                    limit: Limit::Rating(3.0),
                    edge: Edge::Upper,
                },
                Predicate::Equals(Equality::IsUsed(true)),
            ]
        );
    }

    #[test]
    fn unknown_ship_type_adds_no_predicate() {
        let filter = ShipFilter {
            ship_type: Some("CRUISER".to_string()),
            ..ShipFilter::default()
        };
        assert!(build_predicates(&filter).is_empty());

        let filter = ShipFilter {
            ship_type: Some("MILITARY".to_string()),
            ..ShipFilter::default()
        };
        assert_eq!(
            build_predicates(&filter),
            vec![Predicate::Equals(Equality::ShipType(ShipType::Military))]
        );
    }

    #[test]
    fn speed_range_and_usage_combine_with_and() {
        let ships = [
            ship(1, 0.4, true),
            ship(2, 0.5, true),
            ship(3, 0.7, false),
            ship(4, 0.9, true),
            ship(5, 0.95, true),
        ];
        let speed_only = build_predicates(&ShipFilter {
            min_speed: Some(0.5),
            max_speed: Some(0.9),
            ..ShipFilter::default()
        });
        let ids: Vec<i64> = ships
            .iter()
            .filter(|ship| matches_all(&speed_only, ship))
            .map(|ship| ship.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 4]);

        let narrowed = build_predicates(&ShipFilter {
            min_speed: Some(0.5),
            max_speed: Some(0.9),
            is_used: Some(true),
            ..ShipFilter::default()
        });
        let ids: Vec<i64> = ships
            .iter()
            .filter(|ship| matches_all(&narrowed, ship))
            .map(|ship| ship.id)
            .collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn contains_is_case_sensitive() {
        let predicate = Predicate::Contains {
            column: TextColumn::Planet,
            needle: "pit".to_string(),
        };
        assert!(predicate.matches(&ship(1, 0.5, false)));

        let predicate = Predicate::Contains {
            column: TextColumn::Planet,
            needle: "JUP".to_string(),
        };
        assert!(!predicate.matches(&ship(1, 0.5, false)));
    }

    #[test]
    fn sort_key_falls_back_to_id() {
        assert_eq!(SortKey::resolve(Some("SPEED")), SortKey::Speed);
        assert_eq!(SortKey::resolve(Some("DATE")), SortKey::ProdDate);
        assert_eq!(SortKey::resolve(Some("RATING")), SortKey::Rating);
        assert_eq!(SortKey::resolve(Some("speed")), SortKey::Id);
        assert_eq!(SortKey::resolve(Some("CREW")), SortKey::Id);
        assert_eq!(SortKey::resolve(None), SortKey::Id);
        assert_eq!(SortKey::ProdDate.field_name(), "prodDate");
    }

    #[test]
    fn page_request_defaults_and_offsets() {
        let page = PageRequest::resolve(Some(1), Some(3));
        assert_eq!((page.offset(), page.limit()), (3, 3));

        let page = PageRequest::resolve(None, Some(0));
        assert_eq!(page, PageRequest::default());

        let page = PageRequest::resolve(Some(-2), Some(-5));
        assert_eq!((page.offset(), page.limit()), (0, DEFAULT_PAGE_SIZE));
    }

    #[test]
    fn query_resolves_from_params() {
        let query = ShipQuery::from_params(
            &ShipFilter::default(),
            &PageParams {
                order: Some("bogus".to_string()),
                page_number: Some(2),
                page_size: None,
            },
        );
        assert_eq!(query.sort, SortKey::Id);
        assert_eq!(query.page.offset(), 6);
    }
}
