use std::error::Error;

use clap::{Parser, Subcommand};
use engine::{
    Engine, MoneyCents, Order, OrderWithUserInfo, OrderWithUserName, OrdersByUser, User,
    UserWithOrders,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

#[derive(Parser, Debug)]
#[command(name = "reporting_cli")]
#[command(about = "Run the sales reports against a users/orders store")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite::memory:")]
    database_url: String,

    /// Load the demo fixtures before running the report.
    #[arg(long)]
    seed: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Every user with its orders
    UsersWithOrders,
    /// Orders of one user, with the user name
    OrdersByUser { user_id: String },
    /// Sales totals per user, highest first
    SalesTotals,
    /// Products ranked by units sold
    TopProducts,
    /// Users whose name or email contains the term
    Search {
        #[arg(default_value = "")]
        term: String,
    },
    /// Counts, totals and the most active user
    Stats,
    OrdersForUser {
        #[arg(long, default_value_t = 2)]
        user_id: i32,
    },
    OrdersWithUserInfo,
    OrdersInRange {
        #[arg(long, default_value = "100")]
        min: MoneyCents,
        #[arg(long, default_value = "250")]
        max: MoneyCents,
    },
    UsersStartingWith {
        #[arg(default_value = "R")]
        prefix: String,
    },
    OrderCountForUser {
        #[arg(long, default_value_t = 5)]
        user_id: i32,
    },
    OrdersSortedByTotal,
    SumOfTotals,
    CheapestOrder,
    OrdersGroupedByUser,
    /// Run every report in sequence
    All,
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

fn money(value: MoneyCents) -> String {
    format!("${value}")
}

fn print_user(user: &User) {
    println!(
        "  #{} {} <{}> {}",
        user.id,
        user.name,
        user.email,
        user.phone.as_deref().unwrap_or("-")
    );
}

fn print_order(order: &Order) {
    println!(
        "  #{} {} x{} {} (user #{})",
        order.id,
        order.product,
        order.quantity,
        money(order.total),
        order.user_id
    );
}

fn print_users_with_orders(users: &[UserWithOrders]) {
    for entry in users {
        print_user(&entry.user);
        for order in &entry.orders {
            print!("  ");
            print_order(order);
        }
    }
}

fn print_orders_with_name(orders: &[OrderWithUserName]) {
    for entry in orders {
        print_order(&entry.order);
        println!("      by {}", entry.user_name);
    }
}

fn print_orders_with_info(orders: &[OrderWithUserInfo]) {
    for entry in orders {
        print_order(&entry.order);
        println!("      by {} <{}>", entry.user_name, entry.user_email);
    }
}

fn print_grouped(grouped: &OrdersByUser) {
    for (user_id, lines) in grouped {
        println!("  user #{user_id}");
        for line in lines {
            println!(
                "    {} x{} {}",
                line.product,
                line.quantity,
                money(line.total)
            );
        }
    }
}

/// Print the ORM result and report whether the raw SQL run agrees with it.
fn cross_check<T: PartialEq>(title: &str, orm: &T, raw: &T, print: impl Fn(&T)) {
    println!("== {title}");
    print(orm);
    if orm == raw {
        println!("  cross-check: ok");
    } else {
        println!("  cross-check: MISMATCH");
    }
}

async fn run_report(engine: &Engine, command: &Command) -> Result<(), Box<dyn Error + Send + Sync>> {
    match command {
        Command::UsersWithOrders => {
            println!("== Users with orders");
            print_users_with_orders(&engine.users_with_orders().await?);
        }
        Command::OrdersByUser { user_id } => {
            let orders = match engine::parse_user_id(user_id)? {
                Some(id) => engine.orders_by_user(id).await?,
                None => Vec::new(),
            };
            println!("== Orders of user #{}", user_id.trim());
            print_orders_with_name(&orders);
        }
        Command::SalesTotals => {
            println!("== Sales totals by user");
            for row in engine.sales_totals_by_user().await? {
                println!(
                    "  #{} {}: {} in {} orders",
                    row.id,
                    row.name,
                    money(row.total_sales),
                    row.order_count
                );
            }
        }
        Command::TopProducts => {
            println!("== Top products");
            for row in engine.top_products().await? {
                println!(
                    "  {}: {} units, {} in {} orders",
                    row.product,
                    row.total_quantity,
                    money(row.total_sales),
                    row.order_count
                );
            }
        }
        Command::Search { term } => {
            println!("== Users matching \"{term}\"");
            print_users_with_orders(&engine.search_users(term).await?);
        }
        Command::Stats => {
            let stats = engine.general_stats().await?;
            println!("== General statistics");
            println!("  users: {}", stats.user_count);
            println!("  orders: {}", stats.order_count);
            println!("  total sales: {}", money(stats.total_sales));
            match stats.average_sale {
                Some(average) => println!("  average sale: {}", money(average)),
                None => println!("  average sale: -"),
            }
            match stats.most_active_user {
                Some(user) => println!(
                    "  most active user: #{} {} ({} orders)",
                    user.id, user.name, user.order_count
                ),
                None => println!("  most active user: -"),
            }
        }
        Command::OrdersForUser { user_id } => {
            let orm = engine.orders_for_user(*user_id).await?;
            let raw = engine.raw_sql().orders_for_user(*user_id).await?;
            cross_check(&format!("Orders of user #{user_id}"), &orm, &raw, |orders| {
                orders.iter().for_each(print_order)
            });
        }
        Command::OrdersWithUserInfo => {
            let orm = engine.orders_with_user_info().await?;
            let raw = engine.raw_sql().orders_with_user_info().await?;
            cross_check("Orders with user info", &orm, &raw, |orders| {
                print_orders_with_info(orders)
            });
        }
        Command::OrdersInRange { min, max } => {
            let orm = engine.orders_in_range(*min, *max).await?;
            let raw = engine.raw_sql().orders_in_range(*min, *max).await?;
            let title = format!("Orders between {} and {}", money(*min), money(*max));
            cross_check(&title, &orm, &raw, |orders| {
                orders.iter().for_each(print_order)
            });
        }
        Command::UsersStartingWith { prefix } => {
            let orm = engine.users_starting_with(prefix).await?;
            let raw = engine.raw_sql().users_starting_with(prefix).await?;
            let title = format!("Users starting with \"{prefix}\"");
            cross_check(&title, &orm, &raw, |users| users.iter().for_each(print_user));
        }
        Command::OrderCountForUser { user_id } => {
            let orm = engine.order_count_for_user(*user_id).await?;
            let raw = engine.raw_sql().order_count_for_user(*user_id).await?;
            let title = format!("Order count of user #{user_id}");
            cross_check(&title, &orm, &raw, |count| println!("  {count}"));
        }
        Command::OrdersSortedByTotal => {
            let orm = engine.orders_sorted_by_total_desc().await?;
            let raw = engine.raw_sql().orders_sorted_by_total_desc().await?;
            cross_check("Orders by total, highest first", &orm, &raw, |orders| {
                print_orders_with_info(orders)
            });
        }
        Command::SumOfTotals => {
            let orm = engine.sum_of_all_totals().await?;
            let raw = engine.raw_sql().sum_of_all_totals().await?;
            cross_check("Sum of all order totals", &orm, &raw, |total| {
                println!("  {}", money(*total))
            });
        }
        Command::CheapestOrder => {
            let orm = engine.cheapest_order().await?;
            let raw = engine.raw_sql().cheapest_order().await?;
            cross_check("Cheapest order", &orm, &raw, |order| match order {
                Some(order) => print_orders_with_name(std::slice::from_ref(order)),
                None => println!("  no orders"),
            });
        }
        Command::OrdersGroupedByUser => {
            let orm = engine.orders_grouped_by_user().await?;
            let raw = engine.raw_sql().orders_grouped_by_user().await?;
            cross_check("Orders grouped by user", &orm, &raw, print_grouped);
        }
        Command::All => {
            for report in all_reports() {
                Box::pin(run_report(engine, &report)).await?;
                println!();
            }
        }
    }

    Ok(())
}

fn all_reports() -> Vec<Command> {
    vec![
        Command::UsersWithOrders,
        Command::OrdersByUser {
            user_id: "1".to_string(),
        },
        Command::SalesTotals,
        Command::TopProducts,
        Command::Search {
            term: String::new(),
        },
        Command::Stats,
        Command::OrdersForUser { user_id: 2 },
        Command::OrdersWithUserInfo,
        Command::OrdersInRange {
            min: MoneyCents::from_units(100),
            max: MoneyCents::from_units(250),
        },
        Command::UsersStartingWith {
            prefix: "R".to_string(),
        },
        Command::OrderCountForUser { user_id: 5 },
        Command::OrdersSortedByTotal,
        Command::SumOfTotals,
        Command::CheapestOrder,
        Command::OrdersGroupedByUser,
    ]
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error + Send + Sync>> {
    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    if cli.seed {
        let summary = engine.load_fixtures().await?;
        println!(
            "seeded {} users and {} orders\n",
            summary.users, summary.orders
        );
    }

    run_report(&engine, &cli.command).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn range_bounds_parse_as_money() {
        let cli = Cli::try_parse_from([
            "reporting_cli",
            "--database-url",
            "sqlite::memory:",
            "orders-in-range",
            "--min",
            "99.50",
        ])
        .unwrap();

        match cli.command {
            Command::OrdersInRange { min, max } => {
                assert_eq!(min, MoneyCents::new(9_950));
                assert_eq!(max, MoneyCents::from_units(250));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn every_report_is_listed_once_in_all() {
        assert_eq!(all_reports().len(), 15);
    }
}
