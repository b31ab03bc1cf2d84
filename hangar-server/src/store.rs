//! PostgreSQL-backed ship store.

use chrono::NaiveDateTime;
use diesel::dsl::sql;
use diesel::pg::{Pg, PgConnection};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::OptionalExtension;
use diesel::sql_types::Bool;
use hangar_core::{
    Edge, Equality, HangarError, Limit, NewShip, Predicate, Result, Ship, ShipQuery, ShipStore,
    SortKey, TextColumn, start_of_year_millis,
};

use crate::db::DbPool;
use crate::models::{NewShipRecord, ShipRecord, timestamp_from_millis};
use crate::schema::ships;

/// [`ShipStore`] over a Diesel connection pool.
#[derive(Clone)]
pub struct PgShipStore {
    pool: DbPool,
}

impl PgShipStore {
    /// Wrap a connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool.get().map_err(|err| HangarError::Store(err.to_string()))
    }
}

fn store_error(err: diesel::result::Error) -> HangarError {
    HangarError::Store(err.to_string())
}

/// Escape LIKE metacharacters so the needle matches literally.
fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Earliest year a PostgreSQL `timestamp` column can hold.
const EARLIEST_STORED_YEAR: i32 = -4712;

/// How a production-date bound applies to the `prod_date` column.
#[derive(Debug, PartialEq)]
enum DateBound {
    At(NaiveDateTime),
    /// Every stored date satisfies the bound.
    Open,
    /// No stored date satisfies the bound.
    Closed,
}

/// Resolve a bound in epoch milliseconds, including values no column can hold.
fn date_bound(millis: i64, edge: Edge) -> DateBound {
    let earliest = start_of_year_millis(EARLIEST_STORED_YEAR).unwrap_or(i64::MIN);
    let stored = if millis >= earliest {
        timestamp_from_millis(millis).ok()
    } else {
        None
    };
    match (stored, edge, millis < 0) {
        (Some(at), _, _) => DateBound::At(at),
        (None, Edge::Lower, true) | (None, Edge::Upper, false) => DateBound::Open,
        (None, Edge::Lower, false) | (None, Edge::Upper, true) => DateBound::Closed,
    }
}

/// Narrow a boxed ship query by every predicate.
fn filtered(predicates: &[Predicate]) -> ships::BoxedQuery<'static, Pg> {
    let mut query = ships::table.into_boxed();
    for predicate in predicates {
        query = match predicate {
            Predicate::Contains {
                column: TextColumn::Name,
                needle,
            } => query.filter(ships::name.like(like_pattern(needle))),
            Predicate::Contains {
                column: TextColumn::Planet,
                needle,
            } => query.filter(ships::planet.like(like_pattern(needle))),
            Predicate::Equals(Equality::ShipType(ship_type)) => {
                query.filter(ships::ship_type.eq(ship_type.as_str()))
            }
            Predicate::Equals(Equality::IsUsed(is_used)) => {
                query.filter(ships::is_used.eq(*is_used))
            }
            Predicate::Range { limit, edge } => match (*limit, *edge) {
                (Limit::ProdDate(millis), edge) => match (date_bound(millis, edge), edge) {
                    (DateBound::At(at), Edge::Lower) => query.filter(ships::prod_date.ge(at)),
                    (DateBound::At(at), Edge::Upper) => query.filter(ships::prod_date.le(at)),
                    (DateBound::Open, _) => query,
                    (DateBound::Closed, _) => query.filter(sql::<Bool>("FALSE")),
                },
                (Limit::Speed(speed), Edge::Lower) => query.filter(ships::speed.ge(speed)),
                (Limit::Speed(speed), Edge::Upper) => query.filter(ships::speed.le(speed)),
                (Limit::CrewSize(crew), Edge::Lower) => query.filter(ships::crew_size.ge(crew)),
                (Limit::CrewSize(crew), Edge::Upper) => query.filter(ships::crew_size.le(crew)),
                (Limit::Rating(rating), Edge::Lower) => query.filter(ships::rating.ge(rating)),
                (Limit::Rating(rating), Edge::Upper) => query.filter(ships::rating.le(rating)),
            },
        };
    }
    query
}

impl ShipStore for PgShipStore {
    fn find_by_id(&self, id: i64) -> Result<Option<Ship>> {
        let mut conn = self.conn()?;
        ships::table
            .find(id)
            .first::<ShipRecord>(&mut conn)
            .optional()
            .map_err(store_error)?
            .map(Ship::try_from)
            .transpose()
    }

    fn insert(&self, ship: NewShip) -> Result<Ship> {
        let record = NewShipRecord::try_from(ship)?;
        let mut conn = self.conn()?;
        let stored = diesel::insert_into(ships::table)
            .values(&record)
            .get_result::<ShipRecord>(&mut conn)
            .map_err(store_error)?;
        Ship::try_from(stored)
    }

    fn update(&self, ship: Ship) -> Result<Ship> {
        let changes = NewShipRecord::try_from(&ship)?;
        let mut conn = self.conn()?;
        let stored = diesel::update(ships::table.find(ship.id))
            .set(&changes)
            .get_result::<ShipRecord>(&mut conn)
            .optional()
            .map_err(store_error)?
            .ok_or(HangarError::NotFound(ship.id))?;
        Ship::try_from(stored)
    }

    fn delete(&self, ship: &Ship) -> Result<()> {
        let mut conn = self.conn()?;
        let removed = diesel::delete(ships::table.find(ship.id))
            .execute(&mut conn)
            .map_err(store_error)?;
        if removed == 0 {
            return Err(HangarError::NotFound(ship.id));
        }
        Ok(())
    }

    fn query(&self, query: &ShipQuery) -> Result<Vec<Ship>> {
        let statement = filtered(&query.predicates);
        let statement = match query.sort {
            SortKey::Id => statement.order(ships::id.asc()),
            SortKey::Speed => statement.order((ships::speed.asc(), ships::id.asc())),
            SortKey::ProdDate => statement.order((ships::prod_date.asc(), ships::id.asc())),
            SortKey::Rating => statement.order((ships::rating.asc(), ships::id.asc())),
        };
        let mut conn = self.conn()?;
        statement
            .offset(query.page.offset())
            .limit(query.page.limit())
            .load::<ShipRecord>(&mut conn)
            .map_err(store_error)?
            .into_iter()
            .map(Ship::try_from)
            .collect()
    }

    fn count(&self, predicates: &[Predicate]) -> Result<i64> {
        let statement = filtered(predicates);
        let mut conn = self.conn()?;
        statement
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(store_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testing::TestDatabase;
    use hangar_core::{PageRequest, ShipFilter, ShipType, build_predicates};

    const FAR_FUTURE: i64 = 9_000_000_000_000_000;

    fn new_ship(name: &str, speed: f64, is_used: bool, year: i32) -> NewShip {
        NewShip {
            name: name.to_string(),
            planet: "Ganymede".to_string(),
            ship_type: ShipType::Transport,
            prod_date: start_of_year_millis(year).expect("year"),
            is_used,
            speed,
            crew_size: 12,
            rating: hangar_core::rating(speed, year, is_used),
        }
    }

    fn store_in(test_db: &mut TestDatabase) -> PgShipStore {
        PgShipStore::new(test_db.pool())
    }

    fn filter_sql(filter: &ShipFilter) -> String {
        diesel::debug_query::<Pg, _>(&filtered(&build_predicates(filter))).to_string()
    }

    fn names(ships: &[Ship]) -> Vec<&str> {
        ships.iter().map(|ship| ship.name.as_str()).collect()
    }

    #[test]
    fn like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("Nova"), "%Nova%");
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[test]
    fn date_bound_resolves_unstorable_values() {
        let year_2900 = start_of_year_millis(2900).expect("year");
        assert_eq!(
            date_bound(year_2900, Edge::Lower),
            DateBound::At(timestamp_from_millis(year_2900).expect("timestamp"))
        );

        assert_eq!(date_bound(FAR_FUTURE, Edge::Lower), DateBound::Closed);
        assert_eq!(date_bound(FAR_FUTURE, Edge::Upper), DateBound::Open);
        assert_eq!(date_bound(-FAR_FUTURE, Edge::Lower), DateBound::Open);
        assert_eq!(date_bound(-FAR_FUTURE, Edge::Upper), DateBound::Closed);

        // chrono reaches this year but PostgreSQL does not.
        let before_postgres = start_of_year_millis(-10_000).expect("year");
        assert_eq!(date_bound(before_postgres, Edge::Upper), DateBound::Closed);
        assert_eq!(date_bound(i64::MIN, Edge::Lower), DateBound::Open);
        assert_eq!(date_bound(i64::MAX, Edge::Upper), DateBound::Open);
    }

    #[test]
    fn far_future_after_matches_nothing() {
        let sql = filter_sql(&ShipFilter {
            after: Some(FAR_FUTURE),
            ..ShipFilter::default()
        });
        assert!(sql.contains("WHERE FALSE"), "{sql}");
    }

    #[test]
    fn far_future_before_adds_no_condition() {
        let sql = filter_sql(&ShipFilter {
            before: Some(FAR_FUTURE),
            ..ShipFilter::default()
        });
        assert!(!sql.contains("WHERE"), "{sql}");

        let sql = filter_sql(&ShipFilter {
            before: Some(FAR_FUTURE),
            min_crew_size: Some(3),
            ..ShipFilter::default()
        });
        assert!(sql.contains("\"crew_size\" >="), "{sql}");
        assert!(!sql.contains("\"prod_date\" <="), "{sql}");
    }

    #[test]
    fn crud_round_trip() {
        let Some(mut test_db) = TestDatabase::from_env() else {
            return;
        };
        let store = store_in(&mut test_db);

        let created = store
            .insert(new_ship("Aurora", 0.5, false, 2805))
            .expect("insert");
        assert!(created.id > 0);
        assert_eq!(
            store.find_by_id(created.id).expect("find"),
            Some(created.clone())
        );

        let mut renamed = created.clone();
        renamed.name = "Aurora II".to_string();
        assert_eq!(store.update(renamed.clone()).expect("update"), renamed);

        store.delete(&renamed).expect("delete");
        assert_eq!(store.find_by_id(created.id).expect("find"), None);
        assert_eq!(store.delete(&renamed), Err(HangarError::NotFound(created.id)));
        assert_eq!(
            store.update(renamed),
            Err(HangarError::NotFound(created.id))
        );
    }

    #[test]
    fn query_applies_predicates_sort_and_page() {
        let Some(mut test_db) = TestDatabase::from_env() else {
            return;
        };
        let store = store_in(&mut test_db);
        for (name, speed, is_used) in [
            ("A", 0.4, true),
            ("B", 0.5, true),
            ("C", 0.7, false),
            ("D", 0.9, true),
            ("E", 0.95, true),
        ] {
            store
                .insert(new_ship(name, speed, is_used, 2900))
                .expect("insert");
        }

        let filter = ShipFilter {
            min_speed: Some(0.5),
            max_speed: Some(0.9),
            is_used: Some(true),
            ..ShipFilter::default()
        };
        let predicates = build_predicates(&filter);
        assert_eq!(store.count(&predicates).expect("count"), 2);

        let page = store
            .query(&ShipQuery {
                predicates: Vec::new(),
                sort: SortKey::Speed,
                page: PageRequest { number: 1, size: 3 },
            })
            .expect("query");
        assert_eq!(names(&page), vec!["D", "E"]);
    }

    #[test]
    fn every_filter_runs_against_postgres() {
        let Some(mut test_db) = TestDatabase::from_env() else {
            return;
        };
        let store = store_in(&mut test_db);
        let mut nomad = new_ship("Nomad_1", 0.5, false, 2900);
        nomad.planet = "Mars 100%".to_string();
        nomad.ship_type = ShipType::Military;
        nomad.crew_size = 40;
        let mut nomads = new_ship("NomadX1", 0.5, false, 2900);
        nomads.planet = "Mars 1000".to_string();
        nomads.ship_type = ShipType::Military;
        nomads.crew_size = 40;
        for ship in [nomad, nomads, new_ship("Comet", 0.8, true, 3010)] {
            store.insert(ship).expect("insert");
        }

        let count = |filter: ShipFilter| store.count(&build_predicates(&filter)).expect("count");

        assert_eq!(
            count(ShipFilter {
                name: Some("d_".to_string()),
                ..ShipFilter::default()
            }),
            1
        );
        assert_eq!(
            count(ShipFilter {
                planet: Some("0%".to_string()),
                ..ShipFilter::default()
            }),
            1
        );
        assert_eq!(
            count(ShipFilter {
                ship_type: Some("MILITARY".to_string()),
                is_used: Some(false),
                ..ShipFilter::default()
            }),
            2
        );
        assert_eq!(
            count(ShipFilter {
                after: start_of_year_millis(3000),
                before: start_of_year_millis(3019),
                ..ShipFilter::default()
            }),
            1
        );
        assert_eq!(
            count(ShipFilter {
                min_crew_size: Some(13),
                max_crew_size: Some(40),
                ..ShipFilter::default()
            }),
            2
        );
        assert_eq!(
            count(ShipFilter {
                min_rating: Some(1.0),
                max_rating: Some(100.0),
                ..ShipFilter::default()
            }),
            1
        );
        assert_eq!(
            count(ShipFilter {
                after: Some(FAR_FUTURE),
                ..ShipFilter::default()
            }),
            0
        );
        assert_eq!(
            count(ShipFilter {
                before: Some(FAR_FUTURE),
                after: Some(-FAR_FUTURE),
                ..ShipFilter::default()
            }),
            3
        );

        // Equal speeds fall back to id order.
        let by_speed = store
            .query(&ShipQuery {
                predicates: Vec::new(),
                sort: SortKey::Speed,
                page: PageRequest { number: 0, size: 3 },
            })
            .expect("query");
        assert_eq!(names(&by_speed), vec!["Nomad_1", "NomadX1", "Comet"]);
    }
}
