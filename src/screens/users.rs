use crate::{
    auth::AuthType,
    fetch::Resource,
    keep::{
        KeepClient,
        settings::{RuntimeConfig, User},
    },
    view::{LOADING, Table, or_dash, title},
};
use std::future::Future;

pub const TAB: &str = "users";

pub const NO_AUTH_MESSAGE: &str = "Keep cannot add users on NO_AUTH mode. To add users, please set Keep AUTH_TYPE environment variable to either SINGLE_TENANT or MULTI_TENANT";

/// Asks the user for input. `None` means the prompt was cancelled.
pub trait Prompter {
    fn prompt(&self, message: &str) -> impl Future<Output = Option<String>> + Send;

    /// Show a message the user has to acknowledge
    fn alert(&self, message: &str) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Clone, PartialEq)]
pub enum AddUserOutcome {
    Created { email: String },
    Cancelled,
    Unsupported,
    Failed { error: String },
}

/// User management: the tenant's users and the "add user" flow
pub struct UsersScreen {
    client: KeepClient,
    selected_tab: String,
    current_user: Option<String>,
    users: Resource<Vec<User>>,
    config: Resource<RuntimeConfig>,
}

impl UsersScreen {
    pub fn new(client: KeepClient, selected_tab: impl Into<String>) -> Self {
        let current_user = client.session().email.clone();

        Self {
            client,
            selected_tab: selected_tab.into(),
            current_user,
            users: Resource::new("users"),
            config: Resource::new("runtime_config"),
        }
    }

    pub fn is_active(&self) -> bool {
        self.selected_tab == TAB
    }

    /// Fetch the runtime config, and the user list while the tab is selected
    pub async fn load(&self) {
        let load_users = async {
            if self.is_active() {
                self.users.load(self.client.get_users()).await;
            }
        };

        tokio::join!(
            load_users,
            self.config.load(self.client.get_runtime_config())
        );
    }

    pub fn auth_type(&self) -> Option<AuthType> {
        self.config.data().map(|config| config.auth_type)
    }

    pub fn users(&self) -> Option<Vec<User>> {
        self.users.data()
    }

    /// Ask for the new user's credentials according to the auth mode, then create it
    #[tracing::instrument(skip_all)]
    pub async fn add_user<P: Prompter>(&self, prompter: &P) -> AddUserOutcome {
        let (email, password) = match self.auth_type() {
            Some(AuthType::SingleTenant) => {
                let Some(email) = prompter.prompt("Enter the user name").await else {
                    return AddUserOutcome::Cancelled;
                };
                let Some(password) = prompter.prompt("Enter the user password").await else {
                    return AddUserOutcome::Cancelled;
                };
                (email, password)
            }
            Some(AuthType::MultiTenant) => {
                let Some(email) = prompter.prompt("Enter the user email").await else {
                    return AddUserOutcome::Cancelled;
                };
                (email, String::new())
            }
            _ => {
                prompter.alert(NO_AUTH_MESSAGE).await;
                return AddUserOutcome::Unsupported;
            }
        };

        if email.is_empty() {
            return AddUserOutcome::Cancelled;
        }

        match self.client.add_user(&email, &password).await {
            Ok(()) => {
                tracing::info!("User '{}' added", email);

                self.users.invalidate();
                if self.is_active() {
                    self.users.load(self.client.get_users()).await;
                }

                AddUserOutcome::Created { email }
            }
            Err(e) => {
                tracing::error!("Failed to add user '{}': {}", email, e);
                AddUserOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }

    pub fn render(&self) -> String {
        let snapshot = self.users.snapshot();

        if let Some(error) = &snapshot.error {
            return format!("{}\n", error);
        }
        let Some(users) = snapshot.data.filter(|_| !snapshot.is_loading) else {
            return format!("{}\n", LOADING);
        };

        let mut out = title("Users Management");
        out.push_str("Add or remove users from your tenant\n\n");

        let mut table = Table::new(["Email", "Name", "Created At", "Last Login", "Picture"]);
        for user in &users {
            let cells = vec![
                user.email.clone(),
                user.name.clone(),
                user.created_at.clone(),
                or_dash(user.last_login.as_deref()),
                or_dash(user.picture.as_deref()),
            ];

            if Some(&user.email) == self.current_user.as_ref() {
                table.highlighted_row(cells);
            } else {
                table.row(cells);
            }
        }
        out.push_str(&table.render());
        out
    }
}
