//! Request sequencing for overlapping fetches.
//!
//! Fetches are never cancelled, so responses can resolve in any order. Every
//! fetch carries a token issued for its state slot, and only the most recent
//! token per slot may write back into the state.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    List,
    Run,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

#[derive(Debug, Default)]
pub struct RequestSeq {
    issued: u64,
    list: Option<RequestToken>,
    run: Option<RequestToken>,
    output: Option<RequestToken>,
}

impl RequestSeq {
    pub fn issue(&mut self, slot: Slot) -> RequestToken {
        self.issued += 1;
        let token = RequestToken(self.issued);
        *self.latest_mut(slot) = Some(token);
        token
    }

    pub fn is_current(&self, slot: Slot, token: RequestToken) -> bool {
        self.latest(slot) == Some(token)
    }

    /// Drops the outstanding request for `slot`; whatever it resolves to is stale.
    pub fn invalidate(&mut self, slot: Slot) {
        *self.latest_mut(slot) = None;
    }

    fn latest(&self, slot: Slot) -> Option<RequestToken> {
        match slot {
            Slot::List => self.list,
            Slot::Run => self.run,
            Slot::Output => self.output,
        }
    }

    fn latest_mut(&mut self, slot: Slot) -> &mut Option<RequestToken> {
        match slot {
            Slot::List => &mut self.list,
            Slot::Run => &mut self.run,
            Slot::Output => &mut self.output,
        }
    }
}
