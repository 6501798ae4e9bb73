//! Finalization of a builder graph into a [Score].
//!
//! The first pass builds every element in its place and remembers, where
//! each builder went. The second pass turns connection requests (builder
//! to builder) into connections (position to position), checking them
//! against the rules of their notation kind.

use std::collections::{BTreeMap, HashMap, HashSet};

use log::{debug, trace};

use super::{
    assembler::{self, MeasureAt},
    Durational, Measure, Part, Score, Staff,
};
use crate::{
    builders::{
        BuilderId, ConnectionRequest, DurationalBuilder, MeasureBuilder,
        PartBuilder, ScoreBuilder,
    },
    error::{LinkKind, ScoreError, ScoreResult},
    notation::{Connection, NotationId, NotationKind, Ornament},
    primitives::{MeasureAttributes, Position},
};

pub(crate) fn finalize(builder: &ScoreBuilder) -> ScoreResult<Score> {
    if builder.parts().is_empty() {
        return Err(ScoreError::EmptyScore);
    }
    let mut pass = Placement::default();
    let parts = builder
        .parts()
        .iter()
        .enumerate()
        .map(|(index, part)| pass.part(index, part))
        .collect::<ScoreResult<Vec<Part>>>()?;
    assembler::align_parts(&parts)?;
    let time_map = assembler::time_map(&parts);
    debug!(
        "placed {} parts of {} measures, {} builders",
        parts.len(),
        time_map.get().len(),
        pass.locations.len()
    );
    let mut score = Score::new(builder.attributes().clone(), parts, time_map);
    pass.resolve(&mut score)?;
    score.finish();
    Ok(score)
}

#[derive(Debug, Clone, Copy)]
struct PendingRequest {
    source: BuilderId,
    request: ConnectionRequest,
}

#[derive(Debug, Clone, Copy)]
struct PendingAttachment {
    grace: BuilderId,
    principal: BuilderId,
}

/// The first pass: elements built locally, positions of builders.
#[derive(Debug, Default)]
struct Placement {
    locations: HashMap<BuilderId, Vec<Position>>,
    requests: Vec<PendingRequest>,
    attachments: Vec<PendingAttachment>,
}
impl Placement {
    fn place(
        &mut self,
        builder: BuilderId,
        position: Position,
        requests: &[ConnectionRequest],
    ) {
        self.locations.entry(builder).or_default().push(position);
        self.requests.extend(requests.iter().map(|request| PendingRequest {
            source: builder,
            request: *request,
        }));
    }

    fn part(
        &mut self,
        part_index: usize,
        builder: &PartBuilder,
    ) -> ScoreResult<Part> {
        if builder.staves().values().any(|s| s.is_empty())
            || builder.staves().is_empty()
        {
            return Err(ScoreError::EmptyPart { part_index });
        }
        let mut staves = BTreeMap::new();
        for (staff_number, measures) in builder.staves() {
            let first_number = match measures.first() {
                Some(m) if m.is_partial() => 0,
                _ => 1,
            };
            let mut previous: Option<MeasureAttributes> = None;
            let mut built = Vec::with_capacity(measures.len());
            for (measure_index, measure) in measures.iter().enumerate() {
                let at = MeasureAt {
                    part_index,
                    staff_number: *staff_number,
                    measure_index,
                };
                let measure = self.measure(
                    at,
                    first_number + measure_index as u32,
                    measure,
                    previous.as_ref(),
                )?;
                previous = Some(measure.attributes().clone());
                built.push(measure);
            }
            staves.insert(*staff_number, Staff::new(built));
        }
        Ok(Part::new(builder.attributes().clone(), staves))
    }

    fn measure(
        &mut self,
        at: MeasureAt,
        number: u32,
        builder: &MeasureBuilder,
        previous: Option<&MeasureAttributes>,
    ) -> ScoreResult<Measure> {
        let attributes = assembler::effective_attributes(builder, previous, at)?;
        let capacity = attributes.time_signature().total_duration();
        let mut voices = BTreeMap::new();
        for (voice_number, elements) in builder.voices() {
            let elements = elements
                .iter()
                .enumerate()
                .map(|(index, element)| {
                    let position = Position::new(
                        at.part_index,
                        at.staff_number,
                        number,
                        *voice_number,
                        index,
                    );
                    self.element(element, position)
                })
                .collect::<ScoreResult<Vec<_>>>()?;
            let voice = assembler::assemble_voice(
                elements,
                capacity,
                builder.is_partial(),
                at,
                *voice_number,
            )?;
            voices.insert(*voice_number, voice);
        }
        if voices.is_empty() {
            trace!("measure {} of {:?} is empty: whole measure rest", number, at);
            voices.insert(1, assembler::rest_voice(capacity));
        }
        Ok(Measure::new(number, attributes, builder.is_partial(), voices))
    }

    fn element(
        &mut self,
        builder: &DurationalBuilder,
        position: Position,
    ) -> ScoreResult<Durational> {
        let element: Durational = match builder {
            DurationalBuilder::Note(b) => {
                self.place(b.id(), position, b.requests());
                b.build_local(None)?.into()
            }
            DurationalBuilder::Rest(b) => {
                self.place(b.id(), position, b.requests());
                b.build_local()?.into()
            }
            DurationalBuilder::Chord(b) => {
                self.place(b.id(), position, b.requests());
                let (chord, members) = b.build_local()?;
                for (index, member) in members.into_iter().enumerate() {
                    self.place(member.id(), position.in_chord(index), member.requests());
                }
                chord.into()
            }
            DurationalBuilder::GraceNote(b) => {
                self.place(b.id(), position, b.requests());
                self.attach(b.id(), b.principal());
                b.build_local(None)?.into()
            }
            DurationalBuilder::GraceNoteChord(b) => {
                self.place(b.id(), position, b.requests());
                self.attach(b.id(), b.principal());
                let (chord, members) = b.build_local()?;
                for (index, member) in members.into_iter().enumerate() {
                    self.place(member.id(), position.in_chord(index), member.requests());
                    self.attach(member.id(), member.principal());
                }
                chord.into()
            }
        };
        trace!("{} placed at {}", builder.id(), position);
        Ok(element)
    }

    fn attach(&mut self, grace: BuilderId, principal: Option<BuilderId>) {
        if let Some(principal) = principal {
            self.attachments.push(PendingAttachment { grace, principal });
        }
    }

    /// Position of the builder, if it is placed exactly once.
    fn locate(
        &self,
        builder: BuilderId,
        link: LinkKind,
    ) -> ScoreResult<Option<Position>> {
        match self.locations.get(&builder).map(|p| p.as_slice()) {
            None | Some([]) => Ok(None),
            Some([position]) => Ok(Some(*position)),
            Some(many) => Err(ScoreError::AmbiguousReference {
                builder,
                link,
                occurrences: many.len(),
            }),
        }
    }
    fn locate_pair(
        &self,
        source: BuilderId,
        target: BuilderId,
        link: LinkKind,
    ) -> ScoreResult<(Position, Position)> {
        let unresolved = |target| ScoreError::UnresolvedReference {
            origin: source,
            target,
            link,
        };
        let origin = self.locate(source, link)?.ok_or_else(|| unresolved(source))?;
        let target = self.locate(target, link)?.ok_or_else(|| unresolved(target))?;
        Ok((origin, target))
    }

    /// The second pass.
    fn resolve(&self, score: &mut Score) -> ScoreResult<()> {
        let chains = self.chains()?;
        for chain in chains.iter() {
            chain.check_cycles()?;
            for (source, target) in chain.links() {
                validate(score, chain.kind, &source, &target)?;
            }
        }
        for chain in chains.iter() {
            chain.write(score)?;
        }
        let attached = self.resolve_attachments(score)?;
        debug!(
            "resolved {} chains of {} links, {} grace attachments",
            chains.len(),
            self.requests.len(),
            attached
        );
        Ok(())
    }

    fn chains(&self) -> ScoreResult<Vec<Chain>> {
        let mut chains: Vec<Chain> = Vec::new();
        let mut index: HashMap<NotationId, usize> = HashMap::new();
        for pending in self.requests.iter() {
            let notation = pending.request.notation();
            let link = LinkKind::Notation(notation.kind());
            let (origin, target) = self.locate_pair(
                pending.source,
                pending.request.target(),
                link,
            )?;
            let chain_index = *index.entry(notation.id()).or_insert_with(|| {
                chains.push(Chain::new(notation.kind()));
                chains.len() - 1
            });
            chains[chain_index].link(
                (pending.source, origin),
                (pending.request.target(), target),
            )?;
        }
        Ok(chains)
    }

    fn resolve_attachments(&self, score: &mut Score) -> ScoreResult<usize> {
        let link = LinkKind::GraceAttachment;
        let mut ornaments: BTreeMap<Position, (Vec<Position>, Vec<Position>)> =
            BTreeMap::new();
        for attachment in self.attachments.iter() {
            let (grace, principal) =
                self.locate_pair(attachment.grace, attachment.principal, link)?;
            let invalid = |reason: &str| ScoreError::InvalidConnection {
                link,
                origin: grace,
                target: principal,
                reason: reason.to_string(),
            };
            if grace.is_in_chord() {
                return Err(invalid("grace chord notes attach with their chord"));
            }
            match (slot(score, &principal), principal.is_in_chord()) {
                (Some(Slot::Note | Slot::Chord), false) => (),
                _ => return Err(invalid("principal must be a note or a chord")),
            }
            if !grace.is_same_measure_voice(&principal) {
                return Err(ScoreError::ForeignVoice {
                    link,
                    origin: grace,
                    target: principal,
                });
            }
            let (low, high) = match grace < principal {
                true => (grace.index_in_voice(), principal.index_in_voice()),
                false => (principal.index_in_voice(), grace.index_in_voice()),
            };
            let voice = score
                .measure(&grace)
                .and_then(|m| m.voice(grace.voice_number()))
                .ok_or_else(|| invalid("voice is missing"))?;
            if voice.iter().take(high).skip(low + 1).any(|e| !e.is_grace()) {
                return Err(invalid(
                    "only grace elements may stand between grace note and principal",
                ));
            }
            let entry = ornaments.entry(principal).or_default();
            match grace < principal {
                true => entry.0.push(grace),
                false => entry.1.push(grace),
            }
            if let Some(element) = score.element_mut(&grace) {
                element.set_principal(principal);
            }
        }
        for (principal, (mut before, mut after)) in ornaments {
            before.sort();
            after.sort();
            let Some(target) =
                score.element_mut(&principal).and_then(|e| e.ornaments_mut())
            else {
                continue;
            };
            if !before.is_empty() {
                target.push(Ornament::GraceNotes(before));
            }
            if !after.is_empty() {
                target.push(Ornament::SucceedingGraceNotes(after));
            }
        }
        Ok(self.attachments.len())
    }
}

/// Builders linked by one notation handle.
#[derive(Debug)]
struct Chain {
    kind: NotationKind,
    order: Vec<BuilderId>,
    positions: HashMap<BuilderId, Position>,
    following: HashMap<BuilderId, BuilderId>,
    preceding: HashMap<BuilderId, BuilderId>,
}
impl Chain {
    fn new(kind: NotationKind) -> Self {
        Self {
            kind,
            order: Vec::new(),
            positions: HashMap::new(),
            following: HashMap::new(),
            preceding: HashMap::new(),
        }
    }
    fn add_node(&mut self, builder: BuilderId, position: Position) {
        if self.positions.insert(builder, position).is_none() {
            self.order.push(builder);
        }
    }
    fn link(
        &mut self,
        (source, origin): (BuilderId, Position),
        (target, target_position): (BuilderId, Position),
    ) -> ScoreResult<()> {
        if let Some(other) = self.preceding.get(&target) {
            if *other != source {
                return Err(ScoreError::InvalidConnection {
                    link: LinkKind::Notation(self.kind),
                    origin,
                    target: target_position,
                    reason: format!("{} is already preceded by {}", target, other),
                });
            }
        }
        self.add_node(source, origin);
        self.add_node(target, target_position);
        self.following.insert(source, target);
        self.preceding.insert(target, source);
        Ok(())
    }
    /// Every node has to be reached from a node without predecessor.
    fn check_cycles(&self) -> ScoreResult<()> {
        let mut visited = HashSet::new();
        for head in self.order.iter().filter(|b| !self.preceding.contains_key(*b)) {
            let mut current = Some(*head);
            while let Some(node) = current {
                if !visited.insert(node) {
                    break;
                }
                current = self.following.get(&node).copied();
            }
        }
        match self.order.iter().find(|b| !visited.contains(*b)) {
            None => Ok(()),
            Some(builder) => Err(ScoreError::Cycle {
                builder: *builder,
                link: LinkKind::Notation(self.kind),
            }),
        }
    }
    fn position(&self, builder: &BuilderId) -> Option<Position> {
        self.positions.get(builder).copied()
    }
    fn links(&self) -> impl Iterator<Item = (Position, Position)> + '_ {
        self.order.iter().filter_map(|source| {
            let target = self.following.get(source)?;
            Some((self.position(source)?, self.position(target)?))
        })
    }
    fn write(&self, score: &mut Score) -> ScoreResult<()> {
        for builder in self.order.iter() {
            let Some(position) = self.position(builder) else {
                continue;
            };
            let connection = Connection::new(
                self.kind,
                self.preceding.get(builder).and_then(|b| self.position(b)),
                self.following.get(builder).and_then(|b| self.position(b)),
            );
            score
                .connections_mut(&position)
                .ok_or_else(|| ScoreError::InvalidState {
                    builder: *builder,
                    reason: format!("no element at {}", position),
                })?
                .push(connection);
        }
        Ok(())
    }
}

/// What stands at a position, as far as linking rules care.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Note,
    ChordNote,
    Rest,
    Chord,
    GraceNote,
    GraceChordNote,
    GraceNoteChord,
}
impl Slot {
    fn is_single_pitch(&self) -> bool {
        matches!(
            self,
            Self::Note | Self::ChordNote | Self::GraceNote | Self::GraceChordNote
        )
    }
    fn is_pitched(&self) -> bool {
        *self != Self::Rest
    }
}

fn slot(score: &Score, position: &Position) -> Option<Slot> {
    let element = score.get(position)?;
    Some(match (element, position.index_in_chord()) {
        (Durational::Note(_), None) => Slot::Note,
        (Durational::Rest(_), None) => Slot::Rest,
        (Durational::Chord(_), None) => Slot::Chord,
        (Durational::Chord(_), Some(_)) => Slot::ChordNote,
        (Durational::GraceNote(_), None) => Slot::GraceNote,
        (Durational::GraceNoteChord(_), None) => Slot::GraceNoteChord,
        (Durational::GraceNoteChord(_), Some(_)) => Slot::GraceChordNote,
        _ => return None,
    })
}

/// Rules of the notation kind for one link.
fn validate(
    score: &Score,
    kind: NotationKind,
    origin: &Position,
    target: &Position,
) -> ScoreResult<()> {
    let link = LinkKind::Notation(kind);
    let invalid = |reason: &str| {
        Err(ScoreError::InvalidConnection {
            link,
            origin: *origin,
            target: *target,
            reason: reason.to_string(),
        })
    };
    let foreign = || {
        Err(ScoreError::ForeignVoice {
            link,
            origin: *origin,
            target: *target,
        })
    };
    let (Some(from), Some(to)) = (slot(score, origin), slot(score, target)) else {
        return invalid("no element to link");
    };
    let offset = |p: &Position| score.score_offset_of(p).unwrap_or_default();
    match kind {
        NotationKind::Tie => {
            if !from.is_single_pitch() || !to.is_single_pitch() {
                return invalid("only notes can be tied");
            }
            if !origin.is_same_voice(target) {
                return foreign();
            }
            if offset(target) <= offset(origin) {
                return invalid("tie has to go forward in time");
            }
        }
        NotationKind::Tuplet { .. } => {
            let allowed = [Slot::Note, Slot::Rest, Slot::Chord];
            if !allowed.contains(&from) || !allowed.contains(&to) {
                return invalid("tuplet links notes, rests and chords");
            }
            if !origin.is_same_voice(target) {
                return foreign();
            }
            if origin.measure_number() != target.measure_number()
                || target.index_in_voice() != origin.index_in_voice() + 1
            {
                return invalid("tuplet elements are not adjacent");
            }
        }
        _ => {
            if !from.is_pitched() || !to.is_pitched() {
                return invalid("only pitched elements can be linked");
            }
        }
    }
    trace!("{} from {} to {} is valid", kind, origin, target);
    Ok(())
}
