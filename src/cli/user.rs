//! `dolt user`

use super::UserAction;
use crate::error::Result;
use crate::storage::users::{self, NewUser, User};
use crate::storage::Database;

pub fn execute(db: &Database, action: UserAction) -> Result<()> {
    match action {
        UserAction::Add {
            name,
            email,
            slack_user_id,
            slack_team_id,
            avatar,
        } => {
            let user = users::register_user(
                db,
                &NewUser {
                    name,
                    email,
                    slack_user_id,
                    slack_team_id,
                    slack_img_url: avatar,
                },
            )?;
            println!("Registered {}", format_user(&user));
        }
        UserAction::List => {
            let users = users::list_users(db)?;
            if users.is_empty() {
                println!("No users registered.");
            }
            for user in &users {
                println!("{}", format_user(user));
            }
        }
    }
    Ok(())
}

fn format_user(user: &User) -> String {
    format!(
        "#{} {} <{}> ({}/{})",
        user.id, user.name, user.email, user.slack_team_id, user.slack_user_id
    )
}
