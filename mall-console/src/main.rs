use clap::{Args, Parser, Subcommand};
use dotenvy::dotenv;
use mall_console::config::get_configuration;
use mall_console::models::auth::{LoginRequest, RegisterRequest};
use mall_console::models::catalog::{ProductFilter, ProductPayload, ProductStatus};
use mall_console::models::{Role, SearchParams, SortOrder};
use mall_console::nav::menu_for;
use mall_console::startup::build_state;
use mall_console::AppState;
use mall_core::observability::init_tracing;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "mall-console", about = "Shopping mall console client")]
struct Cli {
    /// Overrides `api.base_url` from configuration.
    #[arg(long, env = "MALL_API_URL")]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the session.
    Login {
        email: String,
        #[arg(long, env = "MALL_PASSWORD")]
        password: String,
        /// Page to land on afterwards instead of the role dashboard.
        #[arg(long)]
        return_url: Option<String>,
    },
    /// Create a USER or SHOP account and sign in.
    Register {
        email: String,
        #[arg(long, env = "MALL_PASSWORD")]
        password: String,
        #[arg(long, default_value = "USER")]
        role: Role,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Clear the local session.
    Logout {
        /// Also ask the backend to revoke the token.
        #[arg(long)]
        remote: bool,
    },
    /// Print the cached user.
    Whoami,
    /// Refresh the cached user from the backend.
    Profile,
    /// Resolve a console path through the route guards.
    Open { url: String },
    /// Sidebar entries for the signed-in role.
    Menu,
    Categories,
    Shops(ShopsArgs),
    Products(ProductsArgs),
    /// Manage the signed-in shop's products.
    Product(ProductCommand),
    /// Dashboard figures for the signed-in role.
    Dashboard,
}

#[derive(Args, Debug)]
struct PageArgs {
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long)]
    sort_by: Option<String>,
    #[arg(long, default_value = "asc")]
    order: SortOrder,
    #[arg(long)]
    query: Option<String>,
}

impl PageArgs {
    fn params(&self) -> SearchParams {
        let mut params = SearchParams::default();
        if let Some(page) = self.page {
            params = params.page(page);
        }
        if let Some(limit) = self.limit {
            params = params.limit(limit);
        }
        if let Some(sort_by) = &self.sort_by {
            params = params.sort_by(sort_by, self.order);
        }
        if let Some(query) = &self.query {
            params = params.query(query);
        }
        params
    }
}

#[derive(Args, Debug)]
struct ShopsArgs {
    /// Show a single shop.
    #[arg(long)]
    id: Option<String>,
    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args, Debug)]
struct ProductsArgs {
    /// Show a single product.
    #[arg(long)]
    id: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    shop: Option<String>,
    #[arg(long)]
    min_price: Option<f64>,
    #[arg(long)]
    max_price: Option<f64>,
    #[arg(long)]
    status: Option<ProductStatus>,
    #[command(flatten)]
    page: PageArgs,
}

#[derive(Args, Debug)]
struct ProductCommand {
    #[command(subcommand)]
    command: ProductSubcommand,
}

#[derive(Args, Debug)]
struct ProductFields {
    #[arg(long)]
    name: String,
    #[arg(long)]
    price: f64,
    #[arg(long)]
    category: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    status: Option<ProductStatus>,
}

impl ProductFields {
    fn payload(self) -> ProductPayload {
        ProductPayload {
            name: self.name,
            description: self.description,
            price: self.price,
            category_id: self.category,
            is_available: self.status,
        }
    }
}

#[derive(Subcommand, Debug)]
enum ProductSubcommand {
    Mine(PageArgs),
    Create(ProductFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    Status {
        id: String,
        status: ProductStatus,
    },
    Delete {
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();

    let mut configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;
    if let Some(api_url) = cli.api_url.clone() {
        configuration.api.base_url = api_url;
    }

    init_tracing(
        "mall-console",
        &configuration.log.level,
        configuration.log.json,
    );

    let state = build_state(&configuration)?;
    run(&state, cli.command).await
}

async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login {
            email,
            password,
            return_url,
        } => {
            let user = state.auth.login(&LoginRequest { email, password }).await?;
            let landing = state.router.after_sign_in(return_url.as_deref())?;
            print_json(&serde_json::json!({ "user": user, "landing": landing }))
        }
        Command::Register {
            email,
            password,
            role,
            name,
            phone,
        } => {
            let request = RegisterRequest {
                email,
                password,
                role,
                name,
                phone,
            };
            let user = state.auth.register(&request).await?;
            let landing = state.router.after_sign_in(None)?;
            print_json(&serde_json::json!({ "user": user, "landing": landing }))
        }
        Command::Logout { remote } => {
            if remote {
                state.auth.sign_out().await;
            } else {
                state.auth.logout();
            }
            print_json(&serde_json::json!({ "signedIn": false }))
        }
        Command::Whoami => print_json(&state.session.snapshot()),
        Command::Profile => print_json(&state.auth.refresh_profile().await?),
        Command::Open { url } => print_json(&state.router.navigate(&url)?),
        Command::Menu => {
            let role = signed_in_role(state)?;
            print_json(&menu_for(role))
        }
        Command::Categories => print_json(&state.buyer_api().categories().await?),
        Command::Shops(args) => match args.id {
            Some(id) => print_json(&state.buyer_api().shop(&id).await?),
            None => print_json(&state.buyer_api().shops(&args.page.params()).await?),
        },
        Command::Products(args) => {
            if let Some(id) = &args.id {
                return print_json(&state.buyer_api().product(id).await?);
            }
            let filter = ProductFilter {
                category_id: args.category,
                shop_id: args.shop,
                min_price: args.min_price,
                max_price: args.max_price,
                is_available: args.status,
            };
            let params = args.page.params();
            let products = match state.session.role() {
                Some(Role::Admin) => state.admin_api().products(params, &filter).await?,
                _ => state.buyer_api().products(params, &filter).await?,
            };
            print_json(&products)
        }
        Command::Product(ProductCommand { command }) => {
            let shop = state.shop_api();
            match command {
                ProductSubcommand::Mine(page) => print_json(&shop.my_products(&page.params()).await?),
                ProductSubcommand::Create(fields) => {
                    print_json(&shop.create_product(&fields.payload()).await?)
                }
                ProductSubcommand::Update { id, fields } => {
                    print_json(&shop.update_product(&id, &fields.payload()).await?)
                }
                ProductSubcommand::Status { id, status } => {
                    print_json(&shop.update_status(&id, status).await?)
                }
                ProductSubcommand::Delete { id } => {
                    shop.delete_product(&id).await?;
                    print_json(&serde_json::json!({ "deleted": id }))
                }
            }
        }
        Command::Dashboard => match signed_in_role(state)? {
            Role::Admin => print_json(&state.admin_api().dashboard_stats().await?),
            Role::Shop => print_json(&state.shop_api().dashboard_stats().await?),
            Role::User => print_json(&state.buyer_api().dashboard().await?),
        },
    }
}

fn signed_in_role(state: &AppState) -> anyhow::Result<Role> {
    state
        .session
        .role()
        .ok_or_else(|| anyhow::anyhow!("Not signed in. Run `mall-console login` first."))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
