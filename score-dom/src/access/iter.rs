use std::ops::RangeInclusive;

use crate::{
    dom::{Durational, Part, Score},
    primitives::{OffsetPosition, Position},
};

/// Walk elements of the parts in score order: part, measure, staff,
/// voice, index in voice.
///
/// Offsets are taken from the measure start.
pub(crate) fn walk<'a>(
    parts: impl Iterator<Item = (usize, &'a Part)> + Clone + 'a,
    measures: RangeInclusive<u32>,
) -> impl Iterator<Item = (OffsetPosition, &'a Durational)> + Clone + 'a {
    parts.flat_map(move |(part_index, part)| {
        measures.clone().flat_map(move |number| {
            part.staves()
                .filter_map(move |(staff_number, staff)| {
                    staff.measure(number).map(|m| (staff_number, m))
                })
                .flat_map(move |(staff_number, measure)| {
                    measure.voices().flat_map(move |(voice_number, voice)| {
                        voice.iter_with_offsets().enumerate().map(
                            move |(index, (offset, element))| {
                                let position = Position::new(
                                    part_index,
                                    staff_number,
                                    number,
                                    voice_number,
                                    index,
                                );
                                (OffsetPosition::new(position, offset), element)
                            },
                        )
                    })
                })
        })
    })
}

impl Score {
    /// Every element of the score with its position, in score order.
    ///
    /// Chord notes are not yielded separately: they are reached through
    /// [Position::in_chord] of the chord position.
    ///
    /// # Example
    ///
    /// ```
    /// use score_dom::builders::{MeasureBuilder, NoteBuilder, PartBuilder, ScoreBuilder};
    /// use score_dom::primitives::{Clef, Duration, KeySignature, TimeSignature};
    ///
    /// let mut measure = MeasureBuilder::with_attributes(
    ///     TimeSignature::two_four(),
    ///     KeySignature::c_major(),
    ///     Clef::treble(),
    /// );
    /// measure
    ///     .add(NoteBuilder::with("E4".parse().unwrap(), Duration::quarter()))
    ///     .add(NoteBuilder::with("G4".parse().unwrap(), Duration::quarter()));
    /// let mut part = PartBuilder::new("Flute");
    /// part.add(measure);
    /// let mut builder = ScoreBuilder::new();
    /// builder.add_part(part);
    /// let score = builder.build().unwrap();
    ///
    /// for (position, element) in score.positions() {
    ///     assert_eq!(score.get(&position), Some(element));
    /// }
    /// assert_eq!(score.positions().count(), 2);
    /// ```
    pub fn positions(
        &self,
    ) -> impl Iterator<Item = (Position, &Durational)> + Clone + '_ {
        self.offset_positions()
            .map(|(position, element)| (position.position(), element))
    }
    /// Same as [Score::positions], with offsets from the measure start.
    pub fn offset_positions(
        &self,
    ) -> impl Iterator<Item = (OffsetPosition, &Durational)> + Clone + '_ {
        walk(
            self.parts().enumerate(),
            self.first_measure_number()..=self.last_measure_number(),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        builders::{ChordBuilder, MeasureBuilder, NoteBuilder, PartBuilder, ScoreBuilder},
        primitives::{Clef, Duration, KeySignature, Offset, Position, TimeSignature},
    };

    #[test]
    fn order_and_offsets() {
        let mut upper = MeasureBuilder::with_attributes(
            TimeSignature::two_four(),
            KeySignature::c_major(),
            Clef::treble(),
        );
        upper
            .add(NoteBuilder::with("E5".parse().unwrap(), Duration::quarter()))
            .add(ChordBuilder::from_pitches(
                vec!["C5".parse().unwrap(), "E5".parse().unwrap()],
                Duration::quarter(),
            ))
            .add_to_voice(2, NoteBuilder::with("G4".parse().unwrap(), Duration::half()));
        let mut lower = MeasureBuilder::with_attributes(
            TimeSignature::two_four(),
            KeySignature::c_major(),
            Clef::bass(),
        );
        lower.add(NoteBuilder::with("C3".parse().unwrap(), Duration::half()));
        let mut part = PartBuilder::new("Piano");
        part.add(upper.clone()).add_to_staff(2, lower.clone());
        part.add(MeasureBuilder::new()).add_to_staff(2, MeasureBuilder::new());
        let mut builder = ScoreBuilder::new();
        builder.add_part(part);
        let score = builder.build().unwrap();

        let positions = score
            .offset_positions()
            .map(|(p, _)| (p.position(), p.offset()))
            .collect::<Vec<_>>();
        assert_eq!(
            positions,
            vec![
                (Position::new(0, 1, 1, 1, 0), Offset::zero()),
                (Position::new(0, 1, 1, 1, 1), Offset::new(1, 4).unwrap()),
                (Position::new(0, 1, 1, 2, 0), Offset::zero()),
                (Position::new(0, 2, 1, 1, 0), Offset::zero()),
                (Position::new(0, 1, 2, 1, 0), Offset::zero()),
                (Position::new(0, 2, 2, 1, 0), Offset::zero()),
            ]
        );
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(sorted, positions);
        let iter = score.positions();
        assert_eq!(iter.clone().count(), iter.count());
    }
}
