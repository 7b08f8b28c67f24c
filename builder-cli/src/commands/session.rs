//! `builder sign-in` and `builder sign-out`

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use builder_core::{session, Session};

use crate::home;

#[derive(Args, Debug)]
pub struct SignInArgs {
    /// Builder account name.
    #[arg(long, short = 'u')]
    pub username: String,

    /// Personal access token.
    #[arg(long, short = 't')]
    pub token: String,
}

impl SignInArgs {
    pub fn run(self) -> Result<()> {
        if self.username.trim().is_empty() || self.token.trim().is_empty() {
            bail!("username and token must not be empty");
        }
        let home = home()?;
        let session = Session::new(self.username.trim(), self.token.trim());
        let path = session::save_at(&home, &session).context("failed to save session")?;
        println!(
            "{} Signed in as '{}' ({})",
            "✓".green(),
            session.username,
            path.display()
        );
        Ok(())
    }
}

pub fn sign_out() -> Result<()> {
    let home = home()?;
    if session::clear_at(&home).context("failed to remove session")? {
        println!("{} Signed out", "✓".green());
    } else {
        println!("Not signed in.");
    }
    Ok(())
}
