use std::collections::BTreeMap;

use log::trace;

use super::{DurationalBuilder, PartBuilder, RestBuilder, ScoreBuilder};
use crate::{
    dom::Measure,
    error::{ScoreError, ScoreResult},
    primitives::{
        normalize_fraction, Barline, Clef, Duration, KeySignature, Offset,
        TimeSignature,
    },
};

/// Voices and attributes of one measure of one staff.
///
/// Attributes left unset are inherited from the preceding measure of the
/// staff at finalization. The measure number is given by the position of
/// the measure in its staff.
#[derive(Debug, Clone, Default)]
pub struct MeasureBuilder {
    voices: BTreeMap<u32, Vec<DurationalBuilder>>,
    time_signature: Option<TimeSignature>,
    key_signature: Option<KeySignature>,
    clef: Option<Clef>,
    left_barline: Option<Barline>,
    right_barline: Option<Barline>,
    clef_changes: Vec<(Offset, Clef)>,
    partial: bool,
}
impl MeasureBuilder {
    pub fn new() -> Self {
        Self::default()
    }
    /// Measure with all inheritable attributes set.
    pub fn with_attributes(
        time_signature: TimeSignature,
        key_signature: KeySignature,
        clef: Clef,
    ) -> Self {
        let mut builder = Self::new();
        builder
            .set_time_signature(time_signature)
            .set_key_signature(key_signature)
            .set_clef(clef);
        builder
    }

    pub fn add_to_voice(
        &mut self,
        voice: u32,
        element: impl Into<DurationalBuilder>,
    ) -> &mut Self {
        self.voices.entry(voice).or_default().push(element.into());
        self
    }
    /// Add to the voice 1.
    pub fn add(&mut self, element: impl Into<DurationalBuilder>) -> &mut Self {
        self.add_to_voice(1, element)
    }
    /// Replace element in the voice. Returns false if there is no such.
    pub fn set_element(
        &mut self,
        voice: u32,
        index: usize,
        element: impl Into<DurationalBuilder>,
    ) -> bool {
        match self.get_mut(voice, index) {
            Some(old) => {
                *old = element.into();
                true
            }
            None => false,
        }
    }
    pub fn get(&self, voice: u32, index: usize) -> Option<&DurationalBuilder> {
        self.voices.get(&voice)?.get(index)
    }
    pub fn get_mut(
        &mut self,
        voice: u32,
        index: usize,
    ) -> Option<&mut DurationalBuilder> {
        self.voices.get_mut(&voice)?.get_mut(index)
    }
    pub fn voice(&self, voice: u32) -> Option<&[DurationalBuilder]> {
        self.voices.get(&voice).map(|v| v.as_slice())
    }
    pub fn voices(&self) -> &BTreeMap<u32, Vec<DurationalBuilder>> {
        &self.voices
    }
    pub fn voice_numbers(&self) -> Vec<u32> {
        self.voices.keys().copied().collect()
    }
    pub fn voice_count(&self) -> usize {
        self.voices.len()
    }
    pub fn remove_voice(&mut self, voice: u32) -> Option<Vec<DurationalBuilder>> {
        self.voices.remove(&voice)
    }

    pub fn time_signature(&self) -> Option<TimeSignature> {
        self.time_signature
    }
    pub fn set_time_signature(&mut self, signature: TimeSignature) -> &mut Self {
        self.time_signature = Some(signature);
        self
    }
    pub fn key_signature(&self) -> Option<KeySignature> {
        self.key_signature
    }
    pub fn set_key_signature(&mut self, signature: KeySignature) -> &mut Self {
        self.key_signature = Some(signature);
        self
    }
    pub fn clef(&self) -> Option<Clef> {
        self.clef
    }
    pub fn set_clef(&mut self, clef: Clef) -> &mut Self {
        self.clef = Some(clef);
        self
    }
    pub fn left_barline(&self) -> Option<Barline> {
        self.left_barline
    }
    pub fn set_left_barline(&mut self, barline: Barline) -> &mut Self {
        self.left_barline = Some(barline);
        self
    }
    pub fn right_barline(&self) -> Option<Barline> {
        self.right_barline
    }
    pub fn set_right_barline(&mut self, barline: Barline) -> &mut Self {
        self.right_barline = Some(barline);
        self
    }
    /// Clef change at the offset from measure start.
    pub fn add_clef_change(&mut self, offset: Offset, clef: Clef) -> &mut Self {
        self.clef_changes.push((offset, clef));
        self
    }
    pub fn clef_changes(&self) -> &[(Offset, Clef)] {
        &self.clef_changes
    }
    pub fn is_partial(&self) -> bool {
        self.partial
    }
    /// Partial measures (pickups, split measures) may be shorter, than
    /// their time signature says.
    pub fn set_partial(&mut self, partial: bool) -> &mut Self {
        self.partial = partial;
        self
    }

    /// Sum of time values in the voice. Grace notes take no time, builders
    /// without duration are not counted.
    pub fn total_duration_of_voice(&self, voice: u32) -> Offset {
        self.voices
            .get(&voice)
            .map(|v| v.iter().filter_map(|b| b.time_value()).sum())
            .unwrap_or_default()
    }
    pub fn is_full(&self, voice: u32, time_signature: &TimeSignature) -> bool {
        self.total_duration_of_voice(voice) == time_signature.total_duration()
    }
    pub fn is_overflowing(
        &self,
        voice: u32,
        time_signature: &TimeSignature,
    ) -> bool {
        self.total_duration_of_voice(voice) > time_signature.total_duration()
    }

    /// Cut every overflowing voice to the time signature capacity.
    ///
    /// The element crossing the barline is shortened, the following ones
    /// are removed.
    pub fn trim(&mut self, time_signature: &TimeSignature) -> &mut Self {
        let capacity = Offset::from(time_signature.total_duration());
        let overflowing = self
            .voice_numbers()
            .into_iter()
            .filter(|&number| self.is_overflowing(number, time_signature))
            .collect::<Vec<_>>();
        for (number, voice) in self.voices.iter_mut() {
            if !overflowing.contains(number) {
                continue;
            }
            let mut cursor = Offset::zero();
            let mut cut_at = None;
            for (index, element) in voice.iter_mut().enumerate() {
                if cursor == capacity {
                    cut_at = Some(index);
                    break;
                }
                let Some(duration) = element.time_value() else {
                    continue;
                };
                if cursor + duration > capacity {
                    if let Some(allowed) = capacity.duration_since(&cursor) {
                        element.set_duration(allowed);
                    }
                    cut_at = Some(index + 1);
                    break;
                }
                cursor += duration;
            }
            if let Some(cut_at) = cut_at {
                trace!("trim voice {} at index {}", number, cut_at);
                voice.truncate(cut_at);
            }
        }
        self
    }
    /// Fill voices, that are shorter than the time signature, with rests.
    ///
    /// Partial measures are left as they are.
    pub fn pad_with_rests(&mut self, time_signature: &TimeSignature) -> &mut Self {
        if self.partial {
            return self;
        }
        let capacity = Offset::from(time_signature.total_duration());
        for (number, voice) in self.voices.iter_mut() {
            let total: Offset = voice.iter().filter_map(|b| b.time_value()).sum();
            let Some(missing) = capacity.duration_since(&total) else {
                continue;
            };
            trace!("pad voice {} with {}", number, missing);
            for part in normalize_fraction(missing.as_fraction()) {
                if let Ok(duration) = Duration::from_fraction(part) {
                    voice.push(RestBuilder::new(duration).into());
                }
            }
        }
        self
    }

    /// Build the measure alone, as the only measure of a one-staff part.
    ///
    /// All attributes have to be set. Connections may link only elements of
    /// this measure.
    pub fn build(&self) -> ScoreResult<Measure> {
        let mut part = PartBuilder::new("");
        part.add(self.clone());
        let mut score = ScoreBuilder::new();
        score.add_part(part);
        let score = score.build()?;
        score
            .part(0)
            .and_then(|p| p.staff(1))
            .and_then(|s| s.measures().first())
            .cloned()
            .ok_or(ScoreError::EmptyPart { part_index: 0 })
    }
}
impl From<&Measure> for MeasureBuilder {
    /// Builder with all attributes and elements of the measure.
    ///
    /// Connections and grace note attachments are not carried over.
    fn from(measure: &Measure) -> Self {
        let attributes = measure.attributes();
        let mut builder = Self::with_attributes(
            attributes.time_signature(),
            attributes.key_signature(),
            attributes.clef(),
        );
        builder
            .set_left_barline(attributes.left_barline())
            .set_right_barline(attributes.right_barline())
            .set_partial(measure.is_partial());
        builder.clef_changes = attributes.clef_changes().to_vec();
        for (number, voice) in measure.voices() {
            for element in voice.iter() {
                builder.add_to_voice(number, DurationalBuilder::from(element));
            }
        }
        builder
    }
}

#[cfg(test)]
mod tests {
    use super::MeasureBuilder;
    use crate::{
        builders::{GraceNoteBuilder, NoteBuilder, RestBuilder},
        primitives::{Duration, Offset, Pitch, TimeSignature},
    };

    fn note(duration: Duration) -> NoteBuilder {
        NoteBuilder::with("A4".parse::<Pitch>().unwrap(), duration)
    }

    #[test]
    fn voice_durations() {
        let four_four = TimeSignature::four_four();
        let mut builder = MeasureBuilder::new();
        builder
            .add(note(Duration::half()))
            .add(GraceNoteBuilder::with(
                "B4".parse().unwrap(),
                Duration::eighth(),
            ))
            .add(note(Duration::half()))
            .add_to_voice(2, RestBuilder::new(Duration::whole()))
            .add_to_voice(2, note(Duration::quarter()));
        assert_eq!(builder.voice_numbers(), vec![1, 2]);
        assert!(builder.is_full(1, &four_four));
        assert!(builder.is_overflowing(2, &four_four));
        assert_eq!(
            builder.total_duration_of_voice(2),
            Offset::new(5, 4).unwrap()
        );
        assert_eq!(builder.total_duration_of_voice(3), Offset::zero());
    }

    #[test]
    fn trim_and_pad() {
        let three_four = TimeSignature::three_four();
        let mut builder = MeasureBuilder::new();
        builder
            .add(note(Duration::half()))
            .add(note(Duration::half()))
            .add(note(Duration::quarter()))
            .add_to_voice(2, note(Duration::eighth()));
        builder.trim(&three_four);
        assert_eq!(builder.voice(1).map(|v| v.len()), Some(2));
        assert_eq!(
            builder.get(1, 1).and_then(|b| b.duration()),
            Some(Duration::quarter())
        );
        assert!(builder.is_full(1, &three_four));

        builder.pad_with_rests(&three_four);
        assert!(builder.is_full(2, &three_four));
        assert_eq!(
            builder
                .voice(2)
                .unwrap()
                .iter()
                .map(|b| b.duration().unwrap())
                .collect::<Vec<_>>(),
            vec![Duration::eighth(), Duration::eighth(), Duration::half()]
        );
    }

    #[test]
    fn trim_keeps_full_voice() {
        let four_four = TimeSignature::four_four();
        let mut builder = MeasureBuilder::new();
        builder.add(note(Duration::whole())).add(GraceNoteBuilder::with(
            "B4".parse().unwrap(),
            Duration::eighth(),
        ));
        builder.trim(&four_four);
        assert_eq!(builder.voice(1).map(|v| v.len()), Some(2));
        assert!(builder.is_full(1, &four_four));
    }
}
