//! # POS Session
//!
//! The interactive selling loop behind `till pos`.
//!
//! ## Session Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  reload catalog ──► print grid                                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  ┌─► read line ──► PosCommand::from_line ──► handle(db, config, ...)   │
//! │  │                                              │                      │
//! │  │                          Ok(Outcome) ◄───────┴───────► Err(AppError) │
//! │  │                              │                              │        │
//! │  │                        print text                     print notice   │
//! │  │                              │                              │        │
//! │  └──────────── Continue ◄───────┴──────────────────────────────┘        │
//! │                    Quit ──► leave (cart is dropped)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing typed at the prompt ends the session except `quit` or end of
//! input. A rejected checkout keeps the cart so the operator can fix it.

use std::io::Write;

use clap::{CommandFactory, Parser};
use till_core::report::{inventory_rows, pos_grid, HistoryFilter};
use till_core::{CoreError, QuantityChange};
use till_db::Database;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use super::{dashboard, reports};
use crate::error::{AppError, AppResult, ErrorCode};
use crate::render;
use crate::state::{AppConfig, Session, View};

const PROMPT: &str = "till> ";

// =============================================================================
// Commands
// =============================================================================

/// One line typed at the POS prompt.
///
/// IDs can be shortened to any unique prefix.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "till",
    no_binary_name = true,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
pub enum PosCommand {
    /// Show the sellable products
    #[command(visible_alias = "ls")]
    Grid,
    /// Filter the grid by name (no text clears)
    #[command(visible_alias = "find")]
    Search { text: Vec<String> },
    /// Filter the grid by category ("all" clears)
    #[command(visible_alias = "cat")]
    Category {
        #[arg(required = true)]
        name: Vec<String>,
    },
    /// List categories
    Categories,
    /// Add one unit to the cart
    Add { id: String },
    /// Add one more unit of a cart line
    #[command(visible_alias = "+")]
    Inc { id: String },
    /// Take one unit off a cart line
    Dec { id: String },
    /// Change a cart line by DELTA units
    Qty {
        id: String,
        #[arg(allow_negative_numbers = true)]
        delta: i64,
    },
    /// Remove a cart line
    #[command(visible_alias = "rm")]
    Remove { id: String },
    /// Show the cart
    Cart,
    /// Empty the cart
    Clear,
    /// Complete the sale
    #[command(visible_alias = "pay")]
    Checkout,
    /// Switch to another view
    Go {
        #[arg(value_enum, ignore_case = true)]
        view: View,
    },
    /// List these commands
    Help,
    /// Leave the session
    #[command(visible_aliases = ["exit", "q"])]
    Quit,
}

impl PosCommand {
    /// Parses a prompt line. Blank lines give `Ok(None)`.
    pub fn from_line(line: &str) -> AppResult<Option<Self>> {
        if line.trim().is_empty() {
            return Ok(None);
        }
        PosCommand::try_parse_from(line.split_whitespace())
            .map(Some)
            .map_err(|err| AppError::usage(err.render().to_string().trim_end()))
    }

    /// The command list shown by `help`.
    pub fn help_text() -> String {
        PosCommand::command().render_help().to_string()
    }
}

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// What a handled command produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub text: String,
    pub flow: Flow,
}

impl Outcome {
    fn show(text: impl Into<String>) -> Self {
        Outcome {
            text: text.into(),
            flow: Flow::Continue,
        }
    }
}

// =============================================================================
// Handling
// =============================================================================

/// Applies one command to the session.
///
/// On error the session is exactly as it was before the command.
pub async fn handle(
    db: &Database,
    config: &AppConfig,
    session: &mut Session,
    command: PosCommand,
) -> AppResult<Outcome> {
    debug!(?command, view = %session.view, "POS command");

    match command {
        PosCommand::Grid => {
            session.reload_catalog(db).await?;
            Ok(Outcome::show(grid_text(session, config)))
        }
        PosCommand::Search { text } => {
            session.set_search(&text.join(" "))?;
            Ok(Outcome::show(grid_text(session, config)))
        }
        PosCommand::Category { name } => {
            session.set_category(&name.join(" "))?;
            Ok(Outcome::show(grid_text(session, config)))
        }
        PosCommand::Categories => Ok(Outcome::show(render::categories(
            session.categories(),
            &session.category,
        ))),
        PosCommand::Add { id: input } => {
            let id = session.resolve_id(&input)?;
            let line = session.add_to_cart(&id)?;
            Ok(Outcome::show(format!(
                "{} x{} in cart  (total {})",
                line.name,
                line.quantity,
                config.format_currency(session.cart.total()?.cents())
            )))
        }
        PosCommand::Inc { id } => change_quantity(session, config, &id, 1),
        PosCommand::Dec { id } => change_quantity(session, config, &id, -1),
        PosCommand::Qty { id, delta } => change_quantity(session, config, &id, delta),
        PosCommand::Remove { id: input } => {
            let id = session.resolve_id(&input)?;
            if !session.cart.remove(&id) {
                return Err(AppError::new(
                    ErrorCode::CartError,
                    "That product is not in the cart",
                ));
            }
            Ok(Outcome::show(render::cart(&session.cart, config)?))
        }
        PosCommand::Cart => Ok(Outcome::show(render::cart(&session.cart, config)?)),
        PosCommand::Clear => {
            session.cart.clear();
            Ok(Outcome::show("Cart cleared"))
        }
        PosCommand::Checkout => checkout(db, config, session).await,
        PosCommand::Go { view } => {
            session.navigate(view);
            Ok(Outcome::show(view_text(db, config, session).await?))
        }
        PosCommand::Help => Ok(Outcome::show(PosCommand::help_text())),
        PosCommand::Quit => Ok(Outcome {
            text: String::new(),
            flow: Flow::Quit,
        }),
    }
}

fn change_quantity(
    session: &mut Session,
    config: &AppConfig,
    input: &str,
    delta: i64,
) -> AppResult<Outcome> {
    let id = session.resolve_id(input)?;
    match session.change_quantity(&id, delta)? {
        QuantityChange::NotInCart => Err(AppError::new(
            ErrorCode::CartError,
            "That product is not in the cart",
        )),
        QuantityChange::Updated(_) | QuantityChange::Removed => {
            Ok(Outcome::show(render::cart(&session.cart, config)?))
        }
    }
}

/// Commits the cart. The cart is cleared only once the sale is stored.
async fn checkout(
    db: &Database,
    config: &AppConfig,
    session: &mut Session,
) -> AppResult<Outcome> {
    if session.cart.is_empty() {
        return Err(CoreError::EmptyCart.into());
    }

    let receipt = db.checkout().commit(&session.cart).await?;
    session.cart.clear();
    session.reload_catalog(db).await?;

    info!(sale_id = %receipt.sale_id, "Checkout completed at the console");
    Ok(Outcome::show(render::receipt(&receipt, config)))
}

fn grid_text(session: &Session, config: &AppConfig) -> String {
    let tiles = pos_grid(session.catalog(), &session.search, &session.category);
    render::grid(&tiles, &session.search, &session.category, config)
}

/// Re-derives the current view from fresh data.
async fn view_text(db: &Database, config: &AppConfig, session: &mut Session) -> AppResult<String> {
    session.reload_catalog(db).await?;
    match session.view {
        View::Dashboard => dashboard::show(db, config, false).await,
        View::Pos => Ok(format!(
            "{}\n{}",
            grid_text(session, config),
            render::cart(&session.cart, config)?
        )),
        View::Inventory => Ok(render::inventory(
            &inventory_rows(session.catalog(), ""),
            config,
        )),
        View::Reports => reports::history(db, config, HistoryFilter::Today, false).await,
    }
}

// =============================================================================
// Loop
// =============================================================================

/// Runs the interactive session on stdin/stdout until `quit` or EOF.
pub async fn run(db: &Database, config: &AppConfig) -> AppResult<()> {
    let mut session = Session::new();
    session.navigate(View::Pos);
    println!("{}", view_text(db, config, &mut session).await?);
    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{PROMPT}");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let result = match PosCommand::from_line(&line) {
            Ok(Some(command)) => handle(db, config, &mut session, command).await,
            Ok(None) => continue,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                if !outcome.text.is_empty() {
                    println!("{}", outcome.text);
                }
                if outcome.flow == Flow::Quit {
                    break;
                }
            }
            Err(notice) => println!("! {}", notice.message),
        }
    }

    if !session.cart.is_empty() {
        info!(
            lines = session.cart.line_count(),
            "Session ended with an open cart, discarded"
        );
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use till_core::{ProductDraft, ProductPatch};
    use till_db::DbConfig;

    #[test]
    fn test_command_definition() {
        PosCommand::command().debug_assert();
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(PosCommand::from_line("  ").unwrap(), None);
        assert_eq!(PosCommand::from_line("ls").unwrap(), Some(PosCommand::Grid));
        assert_eq!(
            PosCommand::from_line("search  milk tea ").unwrap(),
            Some(PosCommand::Search {
                text: vec!["milk".to_string(), "tea".to_string()]
            })
        );
        assert_eq!(
            PosCommand::from_line("search").unwrap(),
            Some(PosCommand::Search { text: Vec::new() })
        );
        assert_eq!(
            PosCommand::from_line("qty ab12 -3").unwrap(),
            Some(PosCommand::Qty {
                id: "ab12".to_string(),
                delta: -3
            })
        );
        assert_eq!(
            PosCommand::from_line("go REPORTS").unwrap(),
            Some(PosCommand::Go { view: View::Reports })
        );
        assert_eq!(
            PosCommand::from_line("go home").unwrap(),
            Some(PosCommand::Go {
                view: View::Dashboard
            })
        );
        assert_eq!(PosCommand::from_line("q").unwrap(), Some(PosCommand::Quit));
    }

    #[test]
    fn test_parse_rejects_malformed_lines() {
        for line in ["add", "qty ab12", "qty ab12 x", "go nowhere", "sell everything"] {
            let err = PosCommand::from_line(line).unwrap_err();
            assert_eq!(err.code, ErrorCode::Usage, "{line}");
        }
    }

    #[test]
    fn test_help_lists_commands() {
        let help = PosCommand::help_text();
        for name in ["grid", "search", "qty", "checkout", "quit"] {
            assert!(help.contains(name), "{name}");
        }
    }

    async fn setup() -> (Database, AppConfig, Session, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let tea = db
            .products()
            .insert(ProductDraft {
                name: "Tea".to_string(),
                category: Some("Drinks".to_string()),
                cost_cents: 60,
                price_cents: 100,
                stock: 5,
            })
            .await
            .unwrap();
        let bun = db
            .products()
            .insert(ProductDraft {
                name: "Bun".to_string(),
                category: None,
                cost_cents: 20,
                price_cents: 50,
                stock: 3,
            })
            .await
            .unwrap();

        let mut session = Session::new();
        session.reload_catalog(&db).await.unwrap();
        (db, AppConfig::default(), session, tea.id, bun.id)
    }

    async fn run_line(
        db: &Database,
        config: &AppConfig,
        session: &mut Session,
        line: &str,
    ) -> AppResult<Outcome> {
        let command = PosCommand::from_line(line)?.unwrap();
        handle(db, config, session, command).await
    }

    #[tokio::test]
    async fn test_sell_flow_clears_cart_and_updates_stock() {
        let (db, config, mut session, tea, bun) = setup().await;

        run_line(&db, &config, &mut session, &format!("add {tea}")).await.unwrap();
        run_line(&db, &config, &mut session, &format!("inc {tea}")).await.unwrap();
        run_line(&db, &config, &mut session, &format!("add {}", &bun[..8]))
            .await
            .unwrap();
        assert_eq!(session.cart.total().unwrap().cents(), 250);

        let outcome = run_line(&db, &config, &mut session, "checkout").await.unwrap();
        assert!(outcome.text.contains("Items:  3"));
        assert!(outcome.text.contains("Rs 2.50"));
        assert!(session.cart.is_empty());

        let tea_now = session.catalog().iter().find(|p| p.id == tea).unwrap();
        assert_eq!(tea_now.stock, 3);
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_failed_checkout_keeps_cart() {
        let (db, config, mut session, _, bun) = setup().await;

        for _ in 0..3 {
            run_line(&db, &config, &mut session, &format!("add {bun}")).await.unwrap();
        }

        // Someone sells buns elsewhere.
        let patch = ProductPatch {
            stock: Some(1),
            ..Default::default()
        };
        db.products().update(&bun, &patch).await.unwrap();

        let err = run_line(&db, &config, &mut session, "checkout").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(session.cart.total_quantity(), 3);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_failure_at_checkout_keeps_cart() {
        let (db, config, mut session, tea, _) = setup().await;
        run_line(&db, &config, &mut session, &format!("add {tea}")).await.unwrap();

        sqlx::query("DROP TABLE sale_items")
            .execute(db.pool())
            .await
            .unwrap();

        let err = run_line(&db, &config, &mut session, "checkout").await.unwrap_err();
        assert_eq!(err.message, "Transaction failed, nothing was recorded");
        assert_eq!(session.cart.total_quantity(), 1);
    }

    #[tokio::test]
    async fn test_empty_checkout_and_stock_notice() {
        let (db, config, mut session, _, bun) = setup().await;

        let err = run_line(&db, &config, &mut session, "checkout").await.unwrap_err();
        assert_eq!(err.message, "Cart is empty!");

        run_line(&db, &config, &mut session, &format!("qty {bun} 1"))
            .await
            .unwrap_err();
        run_line(&db, &config, &mut session, &format!("add {bun}")).await.unwrap();
        let err = run_line(&db, &config, &mut session, &format!("qty {bun} 5"))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Only 3 items available in stock.");
        assert_eq!(session.cart.total_quantity(), 1);

        run_line(&db, &config, &mut session, &format!("dec {bun}")).await.unwrap();
        assert!(session.cart.is_empty());
    }

    #[tokio::test]
    async fn test_filters_and_navigation() {
        let (db, config, mut session, _, _) = setup().await;

        let outcome = run_line(&db, &config, &mut session, "category Drinks").await.unwrap();
        assert!(outcome.text.contains("Tea"));
        assert!(!outcome.text.contains("Bun"));

        let outcome = run_line(&db, &config, &mut session, "category all").await.unwrap();
        assert!(outcome.text.contains("General"));

        let outcome = run_line(&db, &config, &mut session, "search bu").await.unwrap();
        assert!(outcome.text.contains("Bun"));
        assert!(!outcome.text.contains("Tea"));

        let outcome = run_line(&db, &config, &mut session, "go dashboard").await.unwrap();
        assert_eq!(session.view, View::Dashboard);
        assert!(outcome.text.contains("Low stock items: 1"));

        let outcome = run_line(&db, &config, &mut session, "quit").await.unwrap();
        assert_eq!(outcome.flow, Flow::Quit);
    }
}
