//! Name-keyed registry of user actors.

use crate::clients::UserClient;
use crate::model::User;
use crate::rewards::LedgerContext;
use crate::user_actor;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Owns one actor per registered user.
///
/// Users are only ever added; the registry never removes a user while the
/// system is running.
pub struct UserRegistry {
    users: RwLock<HashMap<String, UserClient>>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    shutdown: watch::Sender<bool>,
    context: LedgerContext,
    mailbox_size: usize,
}

impl UserRegistry {
    pub fn new(context: LedgerContext, mailbox_size: usize) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            handles: Mutex::new(Vec::new()),
            shutdown: watch::channel(false).0,
            context,
            mailbox_size,
        }
    }

    /// Registers `user` and starts its actor. No-op if the name is taken or
    /// the registry has been shut down.
    ///
    /// Returns `true` if the user was added. Must be called from within a tokio runtime.
    pub fn add_user(&self, user: User) -> bool {
        let mut users = self.users.write();
        if *self.shutdown.borrow() {
            debug!(user = %user.name, "Registry shut down, user not added");
            return false;
        }
        if users.contains_key(&user.name) {
            debug!(user = %user.name, "User already registered");
            return false;
        }
        let name = user.name.clone();
        let (actor, client) = user_actor::new(user, self.mailbox_size);
        let handle = tokio::spawn(actor.run_until(self.context.clone(), self.shutdown.subscribe()));
        users.insert(name, client);
        self.handles.lock().push(handle);
        true
    }

    pub fn get(&self, name: &str) -> Option<UserClient> {
        self.users.read().get(name).cloned()
    }

    pub fn all(&self) -> Vec<UserClient> {
        self.users.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }

    /// Signals every user actor to stop and waits for them to exit.
    ///
    /// Client clones held elsewhere do not keep an actor alive; their later
    /// calls fail with `ActorCommunicationError`.
    pub async fn shutdown(&self) {
        let users = {
            let mut users = self.users.write();
            self.shutdown.send_replace(true);
            std::mem::take(&mut *users)
        };
        let count = users.len();
        drop(users);

        let handles = std::mem::take(&mut *self.handles.lock());
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "User actor task failed");
            }
        }
        info!(users = count, "User actors stopped");
    }
}
