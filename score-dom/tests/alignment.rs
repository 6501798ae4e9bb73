use score_dom::{
    builders::{
        MeasureBuilder, NoteBuilder, PartBuilder, RestBuilder, ScoreBuilder,
    },
    error::{AlignmentIssue, ScoreError},
    primitives::{Clef, Duration, KeySignature, Offset, Pitch, TimeSignature},
};

fn whole_note_measure(time_signature: Option<TimeSignature>) -> MeasureBuilder {
    let mut measure = MeasureBuilder::new();
    if let Some(ts) = time_signature {
        measure
            .set_time_signature(ts)
            .set_key_signature(KeySignature::c_major())
            .set_clef(Clef::treble());
    }
    let duration = time_signature
        .unwrap_or_else(TimeSignature::four_four)
        .total_duration();
    measure.add(NoteBuilder::with(
        "C5".parse::<Pitch>().expect("pitch"),
        duration,
    ));
    measure
}

fn part(measures: usize) -> PartBuilder {
    let mut part = PartBuilder::new("Strings");
    part.add(whole_note_measure(Some(TimeSignature::four_four())));
    for _ in 1..measures {
        part.add(whole_note_measure(None));
    }
    part
}

#[test]
fn measure_count_mismatch() {
    let mut builder = ScoreBuilder::new();
    builder.add_part(part(5)).add_part(part(5)).add_part(part(4));
    match builder.build() {
        Err(ScoreError::ScoreAlignment {
            part_index,
            measure_index,
            issue,
            ..
        }) => {
            assert_eq!(part_index, 2);
            assert_eq!(measure_index, 4);
            assert_eq!(
                issue,
                AlignmentIssue::MeasureCount {
                    expected: 5,
                    found: 4
                }
            );
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn time_signature_mismatch_between_staves() {
    let mut piano = part(3);
    piano.add_to_staff(2, whole_note_measure(Some(TimeSignature::four_four())));
    piano.add_to_staff(2, whole_note_measure(Some(TimeSignature::three_four())));
    piano.add_to_staff(2, whole_note_measure(Some(TimeSignature::three_four())));
    let mut builder = ScoreBuilder::new();
    builder.add_part(piano);
    match builder.build() {
        Err(ScoreError::ScoreAlignment {
            part_index,
            staff_number,
            measure_index,
            issue: AlignmentIssue::TimeSignature { found, .. },
        }) => {
            assert_eq!(part_index, 0);
            assert_eq!(staff_number, 2);
            assert_eq!(measure_index, 1);
            assert_eq!(found, TimeSignature::three_four());
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn partial_measures_align_to_longest_voice() {
    let pickup = |duration: Duration| {
        let mut measure = MeasureBuilder::with_attributes(
            TimeSignature::three_four(),
            KeySignature::c_major(),
            Clef::treble(),
        );
        measure.set_partial(true).add(RestBuilder::new(duration));
        measure
    };
    let body = || {
        let mut measure = MeasureBuilder::new();
        measure.add(RestBuilder::new(Duration::half().add_dot().expect("dot")));
        measure
    };
    let mut flute = PartBuilder::new("Flute");
    flute.add(pickup(Duration::quarter())).add(body());
    let mut horn = PartBuilder::new("Horn");
    horn.add(pickup(Duration::half())).add(body());
    let mut builder = ScoreBuilder::new();
    builder.add_part(flute).add_part(horn);
    let score = builder.build().expect("Can not build score");
    assert_eq!(
        score.time_map().measure_start(1),
        Some(Offset::new(1, 2).expect("offset"))
    );
    assert_eq!(
        score.time_map().total_length(),
        Offset::new(5, 4).expect("offset")
    );

    let mut unmarked = PartBuilder::new("Horn");
    let mut first = pickup(Duration::half().add_dot().expect("dot"));
    first.set_partial(false);
    unmarked.add(first).add(body());
    let mut flute = PartBuilder::new("Flute");
    flute.add(pickup(Duration::quarter())).add(body());
    let mut builder = ScoreBuilder::new();
    builder.add_part(flute).add_part(unmarked);
    assert!(matches!(
        builder.build(),
        Err(ScoreError::ScoreAlignment {
            part_index: 1,
            measure_index: 0,
            issue: AlignmentIssue::Partial { .. },
            ..
        })
    ));
}

#[test]
fn empty_score_and_part() {
    assert_eq!(ScoreBuilder::new().build(), Err(ScoreError::EmptyScore));
    let mut builder = ScoreBuilder::new();
    builder.add_part(part(2)).add_part(PartBuilder::new("Tacet"));
    assert_eq!(builder.build(), Err(ScoreError::EmptyPart { part_index: 1 }));
}
