//! Listing query builder using SeaQuery.
//!
//! Renders a [`MenuFilter`] into the three PostgreSQL statements the listing
//! needs:
//! - cursor lookup (`id` + filter)
//! - page fetch (filter + keyset start + popularity order + limit)
//! - count (filter only)

use sea_query::{Asterisk, Cond, Expr, Iden, Order, PostgresQueryBuilder, Query, SelectStatement};

use super::filter::MenuFilter;
use super::types::MenuCursor;

#[derive(Iden)]
enum SetMenuCol {
    #[iden = "set_menu"]
    Table,
    Id,
    Name,
    Description,
    Status,
    PricePerPerson,
    MinSpend,
    Image,
    Thumbnail,
    IsVegan,
    IsVegetarian,
    IsHalal,
    IsKosher,
    NumberOfOrders,
}

#[derive(Iden)]
enum SetMenuCuisineCol {
    #[iden = "set_menu_cuisine"]
    Table,
    SetMenuId,
    CuisineId,
}

#[derive(Iden)]
enum CuisineCol {
    #[iden = "cuisine"]
    Table,
    Id,
    Slug,
}

/// Query builder for the set menu listing.
pub struct MenuQueryBuilder<'a> {
    filter: &'a MenuFilter,
}

impl<'a> MenuQueryBuilder<'a> {
    pub fn new(filter: &'a MenuFilter) -> Self {
        Self { filter }
    }

    /// WHERE condition for the filter.
    pub fn condition(&self) -> Cond {
        let mut cond = Cond::all()
            .add(Expr::col((SetMenuCol::Table, SetMenuCol::Status)).eq(self.filter.status));

        if let Some(ref slug) = self.filter.cuisine_slug {
            let linked = Query::select()
                .expr(Expr::val(1))
                .from(SetMenuCuisineCol::Table)
                .inner_join(
                    CuisineCol::Table,
                    Expr::col((CuisineCol::Table, CuisineCol::Id))
                        .equals((SetMenuCuisineCol::Table, SetMenuCuisineCol::CuisineId)),
                )
                .and_where(
                    Expr::col((SetMenuCuisineCol::Table, SetMenuCuisineCol::SetMenuId))
                        .equals((SetMenuCol::Table, SetMenuCol::Id)),
                )
                .and_where(Expr::col((CuisineCol::Table, CuisineCol::Slug)).eq(slug.as_str()))
                .to_owned();

            cond = cond.add(Expr::exists(linked));
        }

        cond
    }

    /// Look up `id`, returning its ordering key only if it passes the filter.
    pub fn build_cursor_lookup(&self, id: i32) -> String {
        Query::select()
            .columns([
                (SetMenuCol::Table, SetMenuCol::Id),
                (SetMenuCol::Table, SetMenuCol::NumberOfOrders),
            ])
            .from(SetMenuCol::Table)
            .and_where(Expr::col((SetMenuCol::Table, SetMenuCol::Id)).eq(id))
            .cond_where(self.condition())
            .to_string(PostgresQueryBuilder)
    }

    /// Build the page query.
    ///
    /// Rows are ordered by `number_of_orders DESC, id ASC`. With a `start`
    /// cursor the page begins AT that record: everything strictly less
    /// popular, plus equally popular records with `id >= start.id`.
    pub fn build_page(&self, start: Option<&MenuCursor>, take: u64) -> String {
        let mut query = Query::select();

        query
            .columns([
                (SetMenuCol::Table, SetMenuCol::Id),
                (SetMenuCol::Table, SetMenuCol::Name),
                (SetMenuCol::Table, SetMenuCol::Description),
                (SetMenuCol::Table, SetMenuCol::PricePerPerson),
                (SetMenuCol::Table, SetMenuCol::MinSpend),
                (SetMenuCol::Table, SetMenuCol::Image),
                (SetMenuCol::Table, SetMenuCol::Thumbnail),
                (SetMenuCol::Table, SetMenuCol::IsVegan),
                (SetMenuCol::Table, SetMenuCol::IsVegetarian),
                (SetMenuCol::Table, SetMenuCol::IsHalal),
                (SetMenuCol::Table, SetMenuCol::IsKosher),
                (SetMenuCol::Table, SetMenuCol::NumberOfOrders),
            ])
            .from(SetMenuCol::Table)
            .cond_where(self.condition());

        if let Some(start) = start {
            query.cond_where(Self::keyset_start(start));
        }

        Self::add_listing_order(&mut query);
        query.limit(take);

        query.to_string(PostgresQueryBuilder)
    }

    /// Build the COUNT query for the filter.
    pub fn build_count(&self) -> String {
        Query::select()
            .expr(Expr::col(Asterisk).count())
            .from(SetMenuCol::Table)
            .cond_where(self.condition())
            .to_string(PostgresQueryBuilder)
    }

    fn keyset_start(start: &MenuCursor) -> Cond {
        let orders = || Expr::col((SetMenuCol::Table, SetMenuCol::NumberOfOrders));

        Cond::any()
            .add(orders().lt(start.number_of_orders))
            .add(
                Cond::all()
                    .add(orders().eq(start.number_of_orders))
                    .add(Expr::col((SetMenuCol::Table, SetMenuCol::Id)).gte(start.id)),
            )
    }

    fn add_listing_order(query: &mut SelectStatement) {
        query
            .order_by((SetMenuCol::Table, SetMenuCol::NumberOfOrders), Order::Desc)
            .order_by((SetMenuCol::Table, SetMenuCol::Id), Order::Asc);
    }
}

#[cfg(test)]
// Tests are allowed to use unwrap/expect freely.
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::listing::build_filter;

    #[test]
    fn page_filters_live_status() {
        let filter = build_filter(None);
        let sql = MenuQueryBuilder::new(&filter).build_page(None, 11);

        assert!(sql.contains("FROM \"set_menu\""), "{sql}");
        assert!(sql.contains("\"status\" = 1"), "{sql}");
        assert!(!sql.contains("EXISTS"), "no cuisine subquery expected: {sql}");
        assert!(sql.contains("LIMIT 11"), "{sql}");
    }

    #[test]
    fn page_orders_by_popularity_then_id() {
        let filter = build_filter(None);
        let sql = MenuQueryBuilder::new(&filter).build_page(None, 7);

        let orders = sql.find("\"number_of_orders\" DESC").expect("orders sort");
        let id = sql.find("\"id\" ASC").expect("id tiebreak");
        assert!(orders < id, "popularity must sort before id: {sql}");
    }

    #[test]
    fn cuisine_slug_adds_exists_subquery() {
        let filter = build_filter(Some("italian"));
        let sql = MenuQueryBuilder::new(&filter).build_page(None, 7);

        assert!(sql.contains("EXISTS"), "{sql}");
        assert!(sql.contains("\"set_menu_cuisine\""), "{sql}");
        assert!(sql.contains("'italian'"), "{sql}");
    }

    #[test]
    fn slug_is_quoted_not_interpolated() {
        let filter = build_filter(Some("x' OR '1'='1"));
        let sql = MenuQueryBuilder::new(&filter).build_count();

        assert!(!sql.contains("'x' OR '1'='1'"), "slug must be escaped: {sql}");
    }

    #[test]
    fn cursor_start_is_inclusive_keyset() {
        let filter = build_filter(None);
        let start = MenuCursor {
            id: 5,
            number_of_orders: 40,
        };
        let sql = MenuQueryBuilder::new(&filter).build_page(Some(&start), 7);

        assert!(sql.contains("\"number_of_orders\" < 40"), "{sql}");
        assert!(sql.contains("\"number_of_orders\" = 40"), "{sql}");
        assert!(sql.contains("\"id\" >= 5"), "{sql}");
    }

    #[test]
    fn count_and_cursor_share_the_filter() {
        let filter = build_filter(Some("thai"));
        let builder = MenuQueryBuilder::new(&filter);

        let count = builder.build_count();
        assert!(count.contains("COUNT(*)"), "{count}");
        assert!(count.contains("\"status\" = 1"), "{count}");
        assert!(count.contains("'thai'"), "{count}");
        assert!(!count.contains("LIMIT"), "{count}");

        let cursor = builder.build_cursor_lookup(42);
        assert!(cursor.contains("\"id\" = 42"), "{cursor}");
        assert!(cursor.contains("\"status\" = 1"), "{cursor}");
        assert!(cursor.contains("'thai'"), "{cursor}");
    }
}
