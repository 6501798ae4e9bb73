use super::{
    require_duration, BuilderId, Connectable, ConnectionRequest, Requests,
};
use crate::{
    dom::{ElementId, Rest},
    error::ScoreResult,
    notation::Notation,
    primitives::Duration,
};

#[derive(Debug, Clone)]
pub struct RestBuilder {
    id: BuilderId,
    duration: Option<Duration>,
    requests: Requests,
}
impl Default for RestBuilder {
    fn default() -> Self {
        Self {
            id: BuilderId::next(),
            duration: None,
            requests: Requests::default(),
        }
    }
}
impl RestBuilder {
    pub fn new(duration: Duration) -> Self {
        let mut builder = Self::default();
        builder.duration = Some(duration);
        builder
    }
    pub fn id(&self) -> BuilderId {
        self.id
    }
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }
    pub fn set_duration(&mut self, duration: Duration) -> &mut Self {
        self.duration = Some(duration);
        self
    }
    /// Rests take part only in tuplets.
    pub fn connect_with(
        &mut self,
        notation: Notation,
        target: &impl Connectable,
    ) -> &mut Self {
        self.requests.set(notation, target.builder_id());
        self
    }
    pub fn requests(&self) -> &[ConnectionRequest] {
        self.requests.get()
    }
    pub fn clear_connections(&mut self) -> &mut Self {
        self.requests.clear();
        self
    }
    pub fn duplicate(&self) -> Self {
        Self {
            id: BuilderId::next(),
            duration: self.duration,
            requests: Requests::default(),
        }
    }
    pub fn build(&self) -> ScoreResult<Rest> {
        self.requests.ensure_empty(self.id)?;
        self.build_local()
    }
    pub(crate) fn build_local(&self) -> ScoreResult<Rest> {
        Ok(Rest::new(
            ElementId::next(),
            require_duration(self.duration, self.id)?,
        ))
    }
}
impl Connectable for RestBuilder {
    fn builder_id(&self) -> BuilderId {
        self.id
    }
}
impl From<&Rest> for RestBuilder {
    fn from(rest: &Rest) -> Self {
        Self::new(rest.duration())
    }
}
