use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Engine, EngineError, MoneyCents, fixtures};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn seeded_engine() -> (Engine, DatabaseConnection) {
    let (engine, db) = engine_with_db().await;
    engine.load_fixtures().await.unwrap();
    (engine, db)
}

/// Adds a user that owns no orders and returns its id (6 after the fixtures).
async fn insert_user_without_orders(db: &DatabaseConnection) -> i32 {
    let backend = db.get_database_backend();
    let now = Utc::now();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO users (name, email, phone, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        vec![
            "Lucía Torres".into(),
            "lucia@gmail.com".into(),
            Option::<String>::None.into(),
            now.into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
    6
}

async fn insert_order(db: &DatabaseConnection, user_id: i32, product: &str, total_minor: i64) {
    let backend = db.get_database_backend();
    let now = Utc::now();
    db.execute(Statement::from_sql_and_values(
        backend,
        "INSERT INTO orders (product, quantity, total_minor, user_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            product.into(),
            1_i32.into(),
            total_minor.into(),
            user_id.into(),
            now.into(),
            now.into(),
        ],
    ))
    .await
    .unwrap();
}

fn cents(values: &[i64]) -> Vec<MoneyCents> {
    values.iter().map(|v| MoneyCents::from_units(*v)).collect()
}

#[tokio::test]
async fn fixtures_insert_five_users_and_twelve_orders() {
    let (engine, _db) = engine_with_db().await;

    let summary = engine.load_fixtures().await.unwrap();
    assert_eq!(summary.users, 5);
    assert_eq!(summary.orders, 12);

    let stats = engine.general_stats().await.unwrap();
    assert_eq!(stats.user_count, 5);
    assert_eq!(stats.order_count, 12);
}

#[tokio::test]
async fn sum_of_all_totals_matches_seed() {
    let (engine, _db) = seeded_engine().await;

    let expected: MoneyCents = fixtures::ORDERS
        .iter()
        .map(|order| MoneyCents::new(order.total_minor))
        .sum();
    let total = engine.sum_of_all_totals().await.unwrap();

    assert_eq!(total, expected);
    assert_eq!(total.to_string(), "5699.00");
}

#[tokio::test]
async fn orders_for_user_two_keeps_insertion_order() {
    let (engine, _db) = seeded_engine().await;

    let orders = engine.orders_for_user(2).await.unwrap();
    let totals: Vec<MoneyCents> = orders.iter().map(|o| o.total).collect();

    assert_eq!(totals, cents(&[150, 300, 1200]));
    assert!(orders.iter().all(|o| o.user_id == 2));
}

#[tokio::test]
async fn order_count_for_user_five_is_two() {
    let (engine, _db) = seeded_engine().await;

    assert_eq!(engine.order_count_for_user(5).await.unwrap(), 2);
    assert_eq!(engine.order_count_for_user(99).await.unwrap(), 0);
}

#[tokio::test]
async fn cheapest_order_is_the_small_mouse() {
    let (engine, _db) = seeded_engine().await;

    let cheapest = engine.cheapest_order().await.unwrap().unwrap();
    assert_eq!(cheapest.order.total.to_string(), "25.00");
    assert_eq!(cheapest.order.product, "Mouse Logitech");
    assert_eq!(cheapest.user_name, "Carlos López");

    let all = engine.orders_with_user_info().await.unwrap();
    assert!(all.iter().all(|o| cheapest.order.total <= o.order.total));
}

#[tokio::test]
async fn cheapest_order_on_empty_store_is_none() {
    let (engine, _db) = engine_with_db().await;

    assert_eq!(engine.cheapest_order().await.unwrap(), None);
    assert_eq!(engine.raw_sql().cheapest_order().await.unwrap(), None);
}

#[tokio::test]
async fn users_starting_with_is_anchored_and_case_sensitive() {
    let (engine, _db) = seeded_engine().await;

    let users = engine.users_starting_with("R").await.unwrap();
    let names: Vec<&str> = users.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Roberto Fernández"]);

    // "r" appears inside several names but never at the start.
    assert!(engine.users_starting_with("r").await.unwrap().is_empty());
    assert!(engine.users_starting_with("oberto").await.unwrap().is_empty());
    assert_eq!(engine.users_starting_with("").await.unwrap().len(), 5);
}

#[tokio::test]
async fn orders_in_range_is_boundary_inclusive() {
    let (engine, _db) = seeded_engine().await;

    let lo = MoneyCents::from_units(100);
    let hi = MoneyCents::from_units(250);
    let orders = engine.orders_in_range(lo, hi).await.unwrap();

    let ids: Vec<i32> = orders.iter().map(|o| o.id).collect();
    assert_eq!(ids, [3, 6, 10]);
    assert!(orders.iter().all(|o| lo <= o.total && o.total <= hi));

    let expected = fixtures::ORDERS
        .iter()
        .filter(|o| (lo.cents()..=hi.cents()).contains(&o.total_minor))
        .count();
    assert_eq!(orders.len(), expected);

    let exact = engine.orders_in_range(lo, lo).await.unwrap();
    assert_eq!(exact.iter().map(|o| o.id).collect::<Vec<_>>(), [10]);
}

#[tokio::test]
async fn orders_in_range_rejects_inverted_bounds() {
    let (engine, _db) = seeded_engine().await;

    let lo = MoneyCents::from_units(250);
    let hi = MoneyCents::from_units(100);

    let err = engine.orders_in_range(lo, hi).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
    let err = engine.raw_sql().orders_in_range(lo, hi).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgument(_)));
}

#[tokio::test]
async fn sales_totals_are_sorted_descending() {
    let (engine, _db) = seeded_engine().await;

    let totals = engine.sales_totals_by_user().await.unwrap();
    let sales: Vec<MoneyCents> = totals.iter().map(|t| t.total_sales).collect();
    assert_eq!(sales, cents(&[1650, 1250, 1224, 900, 675]));
    assert!(totals.windows(2).all(|w| w[0].total_sales >= w[1].total_sales));

    assert_eq!(totals[0].name, "María García");
    assert_eq!(totals[0].order_count, 3);

    let sum: MoneyCents = totals.iter().map(|t| t.total_sales).sum();
    assert_eq!(sum, engine.sum_of_all_totals().await.unwrap());
}

#[tokio::test]
async fn sales_totals_ties_keep_lower_user_id_first() {
    let (engine, db) = seeded_engine().await;
    // Roberto (id 5) goes from 900.00 to 1250.00, level with Juan (id 1).
    insert_order(&db, 5, "Webcam Logitech", 35_000).await;

    let totals = engine.sales_totals_by_user().await.unwrap();
    let ranking: Vec<(i32, MoneyCents)> = totals.iter().map(|t| (t.id, t.total_sales)).collect();
    assert_eq!(
        ranking,
        vec![
            (2, MoneyCents::from_units(1650)),
            (1, MoneyCents::from_units(1250)),
            (5, MoneyCents::from_units(1250)),
            (3, MoneyCents::from_units(1224)),
            (4, MoneyCents::from_units(675)),
        ]
    );
}

#[tokio::test]
async fn top_products_order_by_units_then_first_appearance() {
    let (engine, _db) = seeded_engine().await;

    let products = engine.top_products().await.unwrap();
    let head: Vec<(&str, i64)> = products
        .iter()
        .take(4)
        .map(|p| (p.product.as_str(), p.total_quantity))
        .collect();
    assert_eq!(
        head,
        [
            ("Memoria USB", 5),
            ("Mouse Logitech", 3),
            ("Cargador USB-C", 3),
            ("Laptop Dell", 2),
        ]
    );

    let laptop = &products[3];
    assert_eq!(laptop.order_count, 2);
    assert_eq!(laptop.total_sales, MoneyCents::from_units(2400));
    assert_eq!(products.len(), 10);
}

#[tokio::test]
async fn users_with_orders_includes_users_without_orders() {
    let (engine, db) = seeded_engine().await;
    let lonely = insert_user_without_orders(&db).await;

    let users = engine.users_with_orders().await.unwrap();
    assert_eq!(users.len(), 6);

    let total: usize = users.iter().map(|u| u.orders.len()).sum();
    assert_eq!(total, 12);

    let last = users.last().unwrap();
    assert_eq!(last.user.id, lonely);
    assert!(last.orders.is_empty());
    assert_eq!(last.user.phone, None);
}

#[tokio::test]
async fn orders_by_user_returns_empty_for_missing_or_idle_users() {
    let (engine, db) = seeded_engine().await;
    let lonely = insert_user_without_orders(&db).await;

    assert!(engine.orders_by_user(99).await.unwrap().is_empty());
    assert!(engine.orders_by_user(lonely).await.unwrap().is_empty());

    let orders = engine.orders_by_user(1).await.unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.user_name == "Juan Pérez"));
}

#[tokio::test]
async fn search_users_matches_name_or_email_case_sensitively() {
    let (engine, _db) = seeded_engine().await;

    let ids = |users: Vec<engine::UserWithOrders>| -> Vec<i32> {
        users.iter().map(|u| u.user.id).collect()
    };

    assert_eq!(ids(engine.search_users("Mar").await.unwrap()), [2, 4]);
    assert_eq!(ids(engine.search_users("mar").await.unwrap()), [2]);
    assert_eq!(ids(engine.search_users("gmail").await.unwrap()).len(), 5);
    assert_eq!(ids(engine.search_users("").await.unwrap()).len(), 5);
    assert!(engine.search_users("%").await.unwrap().is_empty());

    let found = engine.search_users("roberto@").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].orders.len(), 2);
}

#[tokio::test]
async fn general_stats_reports_average_and_most_active_user() {
    let (engine, _db) = seeded_engine().await;

    let stats = engine.general_stats().await.unwrap();
    assert_eq!(stats.total_sales.to_string(), "5699.00");
    assert_eq!(stats.average_sale.unwrap().to_string(), "474.92");

    // Users 2 and 3 both have three orders, the lower id wins.
    let active = stats.most_active_user.unwrap();
    assert_eq!(active.id, 2);
    assert_eq!(active.name, "María García");
    assert_eq!(active.order_count, 3);
}

#[tokio::test]
async fn general_stats_on_empty_store() {
    let (engine, _db) = engine_with_db().await;

    let stats = engine.general_stats().await.unwrap();
    assert_eq!(stats.user_count, 0);
    assert_eq!(stats.order_count, 0);
    assert_eq!(stats.total_sales, MoneyCents::ZERO);
    assert_eq!(stats.average_sale, None);
    assert_eq!(stats.most_active_user, None);
}

#[tokio::test]
async fn orders_sorted_by_total_keep_ties_stable() {
    let (engine, _db) = seeded_engine().await;

    let orders = engine.orders_sorted_by_total_desc().await.unwrap();
    assert_eq!(orders.len(), 12);
    assert!(orders.windows(2).all(|w| w[0].order.total >= w[1].order.total));

    // Both laptops cost 1200.00; the first inserted stays first.
    assert_eq!(orders[0].order.id, 1);
    assert_eq!(orders[1].order.id, 11);
    assert_eq!(orders[1].user_email, "maria@gmail.com");
}

#[tokio::test]
async fn orders_grouped_by_user_skips_idle_users() {
    let (engine, db) = seeded_engine().await;
    let lonely = insert_user_without_orders(&db).await;

    let grouped = engine.orders_grouped_by_user().await.unwrap();
    assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    assert!(!grouped.contains_key(&lonely));

    let products: Vec<&str> = grouped[&2].iter().map(|l| l.product.as_str()).collect();
    assert_eq!(products, ["Teclado Mecánico", "Monitor Samsung", "Laptop Dell"]);
}

#[tokio::test]
async fn raw_sql_agrees_with_orm_catalog() {
    let (engine, db) = seeded_engine().await;
    insert_user_without_orders(&db).await;
    let raw = engine.raw_sql();
    let lo = MoneyCents::from_units(100);
    let hi = MoneyCents::from_units(250);

    for user_id in [1, 2, 5, 6, 99] {
        assert_eq!(
            engine.orders_for_user(user_id).await.unwrap(),
            raw.orders_for_user(user_id).await.unwrap()
        );
        assert_eq!(
            engine.order_count_for_user(user_id).await.unwrap(),
            raw.order_count_for_user(user_id).await.unwrap()
        );
    }
    for prefix in ["R", "Ma", "r", ""] {
        assert_eq!(
            engine.users_starting_with(prefix).await.unwrap(),
            raw.users_starting_with(prefix).await.unwrap()
        );
    }
    assert_eq!(
        engine.orders_with_user_info().await.unwrap(),
        raw.orders_with_user_info().await.unwrap()
    );
    assert_eq!(
        engine.orders_in_range(lo, hi).await.unwrap(),
        raw.orders_in_range(lo, hi).await.unwrap()
    );
    assert_eq!(
        engine.orders_sorted_by_total_desc().await.unwrap(),
        raw.orders_sorted_by_total_desc().await.unwrap()
    );
    assert_eq!(
        engine.sum_of_all_totals().await.unwrap(),
        raw.sum_of_all_totals().await.unwrap()
    );
    assert_eq!(
        engine.cheapest_order().await.unwrap(),
        raw.cheapest_order().await.unwrap()
    );
    assert_eq!(
        engine.orders_grouped_by_user().await.unwrap(),
        raw.orders_grouped_by_user().await.unwrap()
    );
}

#[tokio::test]
async fn reports_are_deterministic() {
    let (engine, _db) = seeded_engine().await;

    assert_eq!(
        engine.users_with_orders().await.unwrap(),
        engine.users_with_orders().await.unwrap()
    );
    assert_eq!(
        engine.top_products().await.unwrap(),
        engine.top_products().await.unwrap()
    );
    assert_eq!(
        engine.general_stats().await.unwrap(),
        engine.general_stats().await.unwrap()
    );
}

#[tokio::test]
async fn closed_store_is_unavailable() {
    let (engine, db) = seeded_engine().await;
    db.close().await.unwrap();

    let err = engine.orders_for_user(2).await.unwrap_err();
    assert!(matches!(err, EngineError::StoreUnavailable(_)));
    assert_eq!(err.kind(), "store_unavailable");
}
