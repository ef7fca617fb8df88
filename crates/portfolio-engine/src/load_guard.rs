//! Drops results of loads that were superseded or whose page went away
//!
//! Each load takes a ticket from [`LoadGuard::begin`]. When the response
//! arrives the page calls [`LoadGuard::accept`]; only the newest ticket of a
//! mounted page is accepted.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

impl LoadTicket {
    pub fn id(&self) -> u64 {
        self.0
    }

    pub fn from_id(id: u64) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone)]
pub struct LoadGuard {
    generation: u64,
    mounted: bool,
}

impl Default for LoadGuard {
    fn default() -> Self {
        Self {
            generation: 0,
            mounted: true,
        }
    }
}

impl LoadGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    pub fn accept(&self, ticket: LoadTicket) -> bool {
        self.mounted && ticket.0 == self.generation
    }

    /// Invalidate everything in flight without unmounting, e.g. on a filter change
    pub fn invalidate(&mut self) {
        self.generation += 1;
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
        self.generation += 1;
    }

    pub fn remount(&mut self) {
        self.mounted = true;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}
