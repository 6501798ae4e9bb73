//! Local assembly of finalized elements into voices, measures and staves.
//!
//! Nothing here knows about connections: elements come in already built,
//! and leave with their offsets and effective attributes computed.

use log::trace;

use super::{Durational, Part, Rest, Staff, Voice};
use crate::{
    builders::MeasureBuilder,
    dom::ElementId,
    error::{AlignmentIssue, AttributeKind, ScoreError, ScoreResult},
    primitives::{Barline, Duration, MeasureAttributes, Offset, TimeMap},
};

/// Where a measure lives while it is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MeasureAt {
    pub part_index: usize,
    pub staff_number: u32,
    pub measure_index: usize,
}
impl MeasureAt {
    fn missing(&self, attribute: AttributeKind) -> ScoreError {
        ScoreError::MissingAttribute {
            part_index: self.part_index,
            staff_number: self.staff_number,
            measure_index: self.measure_index,
            attribute,
        }
    }
}

/// Attributes of the measure, with unset values taken from the previous
/// measure of the staff.
pub(crate) fn effective_attributes(
    builder: &MeasureBuilder,
    previous: Option<&MeasureAttributes>,
    at: MeasureAt,
) -> ScoreResult<MeasureAttributes> {
    let time_signature = builder
        .time_signature()
        .or_else(|| previous.map(|p| p.time_signature()))
        .ok_or_else(|| at.missing(AttributeKind::TimeSignature))?;
    let key_signature = builder
        .key_signature()
        .or_else(|| previous.map(|p| p.key_signature()))
        .ok_or_else(|| at.missing(AttributeKind::KeySignature))?;
    let clef = builder
        .clef()
        .or_else(|| previous.map(|p| p.last_clef()))
        .ok_or_else(|| at.missing(AttributeKind::Clef))?;

    let capacity = Offset::from(time_signature.total_duration());
    if let Some((offset, _)) =
        builder.clef_changes().iter().find(|(offset, _)| *offset >= capacity)
    {
        return Err(ScoreError::InvalidAttribute {
            part_index: at.part_index,
            staff_number: at.staff_number,
            measure_index: at.measure_index,
            reason: format!(
                "clef change at {} is outside of the measure of {}",
                offset, capacity
            ),
        });
    }
    Ok(MeasureAttributes::new(time_signature, key_signature, clef)
        .with_barlines(
            builder.left_barline().unwrap_or(Barline::None),
            builder.right_barline().unwrap_or(Barline::Single),
        )
        .with_clef_changes(builder.clef_changes().iter().copied()))
}

/// Lay elements of a voice one after another.
///
/// The first element ending after the capacity gives MeasureOverflow,
/// a short voice of a full measure gives MeasureUnderfill.
pub(crate) fn assemble_voice(
    elements: Vec<Durational>,
    capacity: Duration,
    partial: bool,
    at: MeasureAt,
    voice_number: u32,
) -> ScoreResult<Voice> {
    let mut offsets = Vec::with_capacity(elements.len());
    let mut cursor = Offset::zero();
    for (element_index, element) in elements.iter().enumerate() {
        offsets.push(cursor);
        let Some(time_value) = element.time_value() else {
            continue;
        };
        cursor += time_value;
        if cursor > capacity {
            return Err(ScoreError::MeasureOverflow {
                part_index: at.part_index,
                staff_number: at.staff_number,
                measure_index: at.measure_index,
                voice_number,
                element_index,
                capacity,
                reached: cursor,
            });
        }
    }
    if !partial && cursor < capacity {
        return Err(ScoreError::MeasureUnderfill {
            part_index: at.part_index,
            staff_number: at.staff_number,
            measure_index: at.measure_index,
            voice_number,
            capacity,
            reached: cursor,
        });
    }
    trace!(
        "voice {} of {:?}: {} elements, ends at {}",
        voice_number,
        at,
        elements.len(),
        cursor
    );
    Ok(Voice::new(elements, offsets, cursor))
}

/// Voice of the only rest, filling the measure.
pub(crate) fn rest_voice(capacity: Duration) -> Voice {
    let rest = Rest::new(ElementId::next(), capacity);
    Voice::new(vec![rest.into()], vec![Offset::zero()], capacity.into())
}

/// Staff has to follow the reference staff in measure count, time
/// signatures and partial measures.
pub(crate) fn check_alignment(
    reference: &Staff,
    staff: &Staff,
    part_index: usize,
    staff_number: u32,
) -> ScoreResult<()> {
    let fault = |measure_index: usize, issue: AlignmentIssue| {
        Err(ScoreError::ScoreAlignment {
            part_index,
            staff_number,
            measure_index,
            issue,
        })
    };
    for (measure_index, (expected, found)) in
        reference.measures().iter().zip(staff.measures()).enumerate()
    {
        if expected.time_signature() != found.time_signature() {
            return fault(
                measure_index,
                AlignmentIssue::TimeSignature {
                    expected: expected.time_signature(),
                    found: found.time_signature(),
                },
            );
        }
        if expected.is_partial() != found.is_partial() {
            return fault(
                measure_index,
                AlignmentIssue::Partial {
                    expected: expected.is_partial(),
                    found: found.is_partial(),
                },
            );
        }
    }
    if reference.measure_count() != staff.measure_count() {
        return fault(
            reference.measure_count().min(staff.measure_count()),
            AlignmentIssue::MeasureCount {
                expected: reference.measure_count(),
                found: staff.measure_count(),
            },
        );
    }
    Ok(())
}

/// Check every staff of every part against the first staff of the score.
pub(crate) fn align_parts(parts: &[Part]) -> ScoreResult<()> {
    let Some(reference) = parts.first().and_then(|p| p.first_staff()) else {
        return Err(ScoreError::EmptyScore);
    };
    for (part_index, part) in parts.iter().enumerate() {
        for (staff_number, staff) in part.staves() {
            check_alignment(reference, staff, part_index, staff_number)?;
        }
    }
    Ok(())
}

/// Layout of measures for the aligned parts.
///
/// A partial measure lasts as long as its longest voice in the score.
pub(crate) fn time_map(parts: &[Part]) -> TimeMap {
    let Some(reference) = parts.first().and_then(|p| p.first_staff()) else {
        return TimeMap::new(Vec::new());
    };
    let begin = reference.first_number().unwrap_or(1);
    let staves = parts
        .iter()
        .flat_map(|p| p.staves().map(|(_, staff)| staff))
        .collect::<Vec<_>>();
    TimeMap::from_lengths(
        begin,
        reference.measures().iter().enumerate().map(|(index, measure)| {
            let length = match measure.is_partial() {
                false => Offset::from(measure.time_signature().total_duration()),
                true => staves
                    .iter()
                    .filter_map(|s| s.measures().get(index))
                    .map(|m| m.longest_voice())
                    .max()
                    .unwrap_or_default(),
            };
            (measure.time_signature(), length)
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::{assemble_voice, effective_attributes, MeasureAt};
    use crate::{
        builders::{GraceNoteBuilder, MeasureBuilder, NoteBuilder},
        dom::Durational,
        error::{AttributeKind, ScoreError},
        primitives::{Clef, Duration, KeySignature, Offset, TimeSignature},
    };

    const AT: MeasureAt = MeasureAt {
        part_index: 0,
        staff_number: 1,
        measure_index: 0,
    };

    fn notes(durations: &[Duration]) -> Vec<Durational> {
        durations
            .iter()
            .map(|d| {
                NoteBuilder::with("G4".parse().unwrap(), *d)
                    .build()
                    .unwrap()
                    .into()
            })
            .collect()
    }

    #[test]
    fn offsets() {
        let mut elements = notes(&[Duration::half(), Duration::quarter()]);
        let grace = GraceNoteBuilder::with("A4".parse().unwrap(), Duration::eighth())
            .build()
            .unwrap();
        elements.insert(1, grace.into());
        let voice =
            assemble_voice(elements, Duration::whole(), true, AT, 1).unwrap();
        assert_eq!(voice.offset_of(1), voice.offset_of(2));
        assert_eq!(voice.offset_of(2), Some(Offset::new(1, 2).unwrap()));
        assert_eq!(voice.total_duration(), Offset::new(3, 4).unwrap());
    }

    #[test]
    fn overflow_and_underfill() {
        let elements =
            notes(&[Duration::half(), Duration::half(), Duration::quarter()]);
        match assemble_voice(elements, Duration::whole(), false, AT, 2) {
            Err(ScoreError::MeasureOverflow {
                voice_number,
                element_index,
                ..
            }) => {
                assert_eq!(voice_number, 2);
                assert_eq!(element_index, 2);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        let elements = notes(&[Duration::half()]);
        assert!(matches!(
            assemble_voice(elements.clone(), Duration::whole(), false, AT, 1),
            Err(ScoreError::MeasureUnderfill { .. })
        ));
        assert!(assemble_voice(elements, Duration::whole(), true, AT, 1).is_ok());
    }

    #[test]
    fn inheritance() {
        let mut first = MeasureBuilder::with_attributes(
            TimeSignature::three_four(),
            KeySignature::new(2).unwrap(),
            Clef::treble(),
        );
        first.add_clef_change(Offset::new(1, 2).unwrap(), Clef::bass());
        let first = effective_attributes(&first, None, AT).unwrap();
        let mut second = MeasureBuilder::new();
        second.set_key_signature(KeySignature::c_major());
        let second = effective_attributes(&second, Some(&first), AT).unwrap();
        assert_eq!(second.time_signature(), TimeSignature::three_four());
        assert_eq!(second.key_signature(), KeySignature::c_major());
        assert_eq!(second.clef(), Clef::bass());
        assert!(second.clef_changes().is_empty());

        let mut lacking = MeasureBuilder::new();
        lacking
            .set_time_signature(TimeSignature::four_four())
            .set_clef(Clef::alto());
        assert_eq!(
            effective_attributes(&lacking, None, AT),
            Err(ScoreError::MissingAttribute {
                part_index: 0,
                staff_number: 1,
                measure_index: 0,
                attribute: AttributeKind::KeySignature,
            })
        );

        let mut outside = MeasureBuilder::new();
        outside.add_clef_change(Offset::new(3, 4).unwrap(), Clef::bass());
        assert!(matches!(
            effective_attributes(&outside, Some(&first), AT),
            Err(ScoreError::InvalidAttribute { .. })
        ));
    }
}
