use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use catalogue_auth::authz::is_system_role;
use catalogue_auth::authz::PermissionRegistry;
use catalogue_auth::models::user::NewUser;
use catalogue_auth::{ClientConfig, FileTokenStore, HttpClient, SessionManager};

#[derive(Parser, Debug)]
#[command(author, version, about = "catalogue auth client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Authenticate and persist the session token
    Login { email: String, password: String },
    /// Create an account and log in with it
    Register {
        email: String,
        nom: String,
        prenom: String,
        password: String,
    },
    /// Drop the session and the persisted token
    Logout,
    /// Show the current identity, role and permissions
    Whoami,
    /// Evaluate a permission name locally and against the server
    Check { permission: String },
    /// List roles with their permissions
    Roles,
    /// List users (requires users.read)
    Users,
    /// Delete a role by name (system roles are refused)
    DeleteRole { name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;
    let client = Arc::new(HttpClient::new(&config));
    let store = Arc::new(FileTokenStore::from_config(&config));
    let mut manager = SessionManager::new(client.clone(), store);

    match cli.command {
        Commands::Login { email, password } => {
            manager.login(&email, &password).await?;
            print_identity(&manager)?;
        }
        Commands::Register {
            email,
            nom,
            prenom,
            password,
        } => {
            let new_user = NewUser {
                email,
                nom,
                prenom,
                password,
            };
            manager.register(&new_user).await?;
            print_identity(&manager)?;
        }
        Commands::Logout => {
            manager.logout()?;
            println!("Logged out");
        }
        Commands::Whoami => {
            require_session(&mut manager).await?;
            print_identity(&manager)?;
        }
        Commands::Check { permission } => {
            require_session(&mut manager).await?;
            let local = manager.has_permission(&permission);

            let (resource, action) = permission
                .split_once('.')
                .context("permission must look like resource.action")?;
            let check = catalogue_auth::models::rbac::PermissionCheck {
                resource: resource.to_string(),
                action: action.to_string(),
            };
            let remote = client.check_permission(manager.token()?, &check).await?;

            println!("local:  {}", if local { "granted" } else { "denied" });
            println!("server: {}", remote.message);
        }
        Commands::Roles => {
            require_session(&mut manager).await?;
            let catalog = client.roles_and_permissions(manager.token()?).await?;
            let registry = PermissionRegistry::new(catalog);
            for role in registry.roles() {
                let status = if role.role.is_active { "active" } else { "disabled" };
                println!("{} ({}) [{}]", role.role.name, role.role.display_name, status);
                for permission in &role.permissions {
                    println!("    {}", permission.name);
                }
            }
        }
        Commands::Users => {
            require_session(&mut manager).await?;
            let users = client.list_users(manager.token()?).await?;
            println!("{:<6} {:<30} {:<15} {}", "Id", "Email", "Role", "Active");
            for user in users {
                println!(
                    "{:<6} {:<30} {:<15} {}",
                    user.user.id, user.user.email, user.role_name, user.user.is_active
                );
            }
        }
        Commands::DeleteRole { name } => {
            require_session(&mut manager).await?;
            if is_system_role(&name) {
                bail!("'{name}' is a system role and cannot be deleted");
            }
            let token = manager.token()?.to_string();
            let catalog = client.roles_and_permissions(&token).await?;
            let registry = PermissionRegistry::new(catalog);
            let role = registry
                .role(&name)
                .with_context(|| format!("role '{name}' not found"))?;
            let reply = client.delete_role(&token, role.role.id).await?;
            println!("{}", reply.message);
        }
    }

    Ok(())
}

async fn require_session(manager: &mut SessionManager) -> anyhow::Result<()> {
    if !manager.load_persisted_session().await {
        bail!("not logged in; run `catalogue login <email> <password>` first");
    }
    Ok(())
}

fn print_identity(manager: &SessionManager) -> anyhow::Result<()> {
    let session = manager.session().context("no active session")?;
    let user = &session.user;
    println!("{} {} <{}>", user.user.prenom, user.user.nom, user.user.email);
    println!("role: {} ({})", user.role_name, user.role_display_name);

    let mut permissions: Vec<&String> = user.permissions.iter().collect();
    permissions.sort();
    for permission in permissions {
        println!("    {permission}");
    }
    Ok(())
}

fn load_env() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let crate_env = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    let _ = dotenvy::from_path(crate_env);
}

fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
