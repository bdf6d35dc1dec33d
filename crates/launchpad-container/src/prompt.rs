use secrecy::{ExposeSecret, SecretString};
use std::io::{BufRead, Write};

/// Environment variable carrying the registry address for the login command.
pub const LOGIN_HOST_VAR: &str = "DOCKER_HOST";
/// Environment variable carrying the registry username for the login command.
pub const LOGIN_USER_VAR: &str = "DOCKER_USER";
/// Environment variable carrying the registry password for the login command.
pub const LOGIN_PASSWORD_VAR: &str = "DOCKER_PASS";

/// Interactive questions asked during build recovery.
///
/// Only consulted when running interactively.
pub trait Prompter: Send + Sync {
    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> std::io::Result<bool>;

    /// Ask for a non-empty line of text.
    fn ask(&self, message: &str) -> std::io::Result<String>;

    /// Ask for a value without echoing it.
    fn ask_secret(&self, message: &str) -> std::io::Result<SecretString>;
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&self, message: &str) -> std::io::Result<bool> {
        print!("{message} [Y/n] ");
        std::io::stdout().flush()?;

        let input = read_line()?;
        Ok(matches!(input.trim(), "" | "y" | "Y" | "yes" | "YES"))
    }

    fn ask(&self, message: &str) -> std::io::Result<String> {
        loop {
            print!("{message} ");
            std::io::stdout().flush()?;

            let input = read_line()?;
            let input = input.trim();
            if !input.is_empty() {
                return Ok(input.to_owned());
            }
        }
    }

    fn ask_secret(&self, message: &str) -> std::io::Result<SecretString> {
        rpassword::prompt_password(format!("{message} ")).map(SecretString::from)
    }
}

fn read_line() -> std::io::Result<String> {
    let mut input = String::new();
    if std::io::stdin().lock().read_line(&mut input)? == 0 {
        return Err(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stdin closed while waiting for input",
        ));
    }
    Ok(input)
}

/// Registry credentials gathered for an interactive login.
pub struct RegistryCredentials {
    pub registry: String,
    pub username: String,
    pub password: SecretString,
}

impl RegistryCredentials {
    /// Ask for registry address, username and (masked) password.
    pub fn gather<P: Prompter + ?Sized>(prompter: &P) -> std::io::Result<Self> {
        println!();
        let registry = prompter.ask("What's the registry address?")?;
        let username = prompter.ask("Enter username:")?;
        let password = prompter.ask_secret("Enter password:")?;

        Ok(Self {
            registry,
            username,
            password,
        })
    }

    /// Environment handed to the login command.
    pub fn login_env(&self) -> Vec<(String, String)> {
        vec![
            (LOGIN_HOST_VAR.to_owned(), self.registry.clone()),
            (LOGIN_USER_VAR.to_owned(), self.username.clone()),
            (
                LOGIN_PASSWORD_VAR.to_owned(),
                self.password.expose_secret().to_owned(),
            ),
        ]
    }
}

impl std::fmt::Debug for RegistryCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistryCredentials")
            .field("registry", &self.registry)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}
