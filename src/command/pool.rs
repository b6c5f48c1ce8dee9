//! Bounded command storage.
//!
//! One slot per [`Operation`], allocated once at boot.  Loading a command
//! overwrites its operation's slot in place and hands back a
//! [`PooledCommand`] guard; dropping the guard returns the slot to its
//! resting state.  The guard borrows the pool mutably, so at most one
//! command is live at a time.

use core::ops::Deref;

use log::trace;

use super::{Command, Operation};

pub struct CommandPool {
    slots: [Command; Operation::COUNT],
    in_use: Option<Operation>,
    loads: u32,
}

impl CommandPool {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|i| Command::placeholder(Operation::ALL[i])),
            in_use: None,
            loads: 0,
        }
    }

    /// Store `command` in its operation's slot.
    pub fn load(&mut self, command: Command) -> PooledCommand<'_> {
        let operation = command.operation();
        self.slots[operation.index()] = command;
        self.in_use = Some(operation);
        self.loads = self.loads.wrapping_add(1);
        trace!("CMD: slot {:?} loaded", operation);
        PooledCommand {
            pool: self,
            operation,
        }
    }

    /// Operation whose slot is currently held, if any.
    pub fn in_use(&self) -> Option<Operation> {
        self.in_use
    }

    /// Total commands loaded since boot.
    pub fn loads(&self) -> u32 {
        self.loads
    }

    fn release(&mut self, operation: Operation) {
        self.slots[operation.index()] = Command::placeholder(operation);
        self.in_use = None;
        trace!("CMD: slot {:?} released", operation);
    }
}

impl Default for CommandPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrow of one loaded pool slot.
pub struct PooledCommand<'p> {
    pool: &'p mut CommandPool,
    operation: Operation,
}

impl PooledCommand<'_> {
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

impl Deref for PooledCommand<'_> {
    type Target = Command;

    fn deref(&self) -> &Command {
        &self.pool.slots[self.operation.index()]
    }
}

impl Drop for PooledCommand<'_> {
    fn drop(&mut self) {
        self.pool.release(self.operation);
    }
}
