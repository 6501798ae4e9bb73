use itertools::Itertools;
use score_dom::{
    builders::{
        ChordBuilder, GraceNoteBuilder, MeasureBuilder, NoteBuilder,
        PartBuilder, RestBuilder, ScoreBuilder,
    },
    dom::Score,
    error::{AttributeKind, ScoreError},
    primitives::{
        Barline, Clef, Duration, KeySignature, Offset, Pitch, Position,
        TimeSignature,
    },
};

fn note(name: &str, duration: Duration) -> NoteBuilder {
    NoteBuilder::with(name.parse::<Pitch>().expect("bad pitch"), duration)
}

fn measure(time_signature: TimeSignature) -> MeasureBuilder {
    MeasureBuilder::with_attributes(
        time_signature,
        KeySignature::c_major(),
        Clef::treble(),
    )
}

fn build(measures: Vec<MeasureBuilder>) -> Result<Score, ScoreError> {
    let mut part = PartBuilder::new("Oboe");
    for m in measures {
        part.add(m);
    }
    let mut builder = ScoreBuilder::new();
    builder.add_part(part);
    builder.build()
}

#[test]
fn exact_fill() {
    let mut m = measure(TimeSignature::three_four());
    m.add(note("C4", Duration::quarter().add_dot().expect("dot")))
        .add(note("D4", Duration::eighth()))
        .add(note("E4", Duration::quarter()));
    let score = build(vec![m]).expect("Can not build score");
    let voice = score
        .part(0)
        .and_then(|p| p.measure(1, 1))
        .and_then(|m| m.voice(1))
        .expect("no voice");
    voice
        .iter_with_offsets()
        .map(|(offset, _)| offset)
        .zip_eq(vec![
            Offset::zero(),
            Offset::new(3, 8).expect("offset"),
            Offset::new(1, 2).expect("offset"),
        ])
        .map(|(a, b)| assert_eq!(a, b))
        .count();
    assert_eq!(voice.total_duration(), Offset::new(3, 4).expect("offset"));
}

#[test]
fn overflow() {
    let mut m = measure(TimeSignature::four_four());
    m.add(note("C4", Duration::half()))
        .add_to_voice(3, note("C4", Duration::half()))
        .add_to_voice(
            3,
            ChordBuilder::from_pitches(
                vec!["E4".parse::<Pitch>().expect("pitch")],
                Duration::half(),
            ),
        )
        .add_to_voice(3, RestBuilder::new(Duration::eighth()));
    m.add(note("C4", Duration::half()));
    match build(vec![m]) {
        Err(ScoreError::MeasureOverflow {
            voice_number,
            element_index,
            reached,
            ..
        }) => {
            assert_eq!(voice_number, 3);
            assert_eq!(element_index, 2);
            assert_eq!(reached, Offset::new(9, 8).expect("offset"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn underfill_and_partial() {
    let mut m = measure(TimeSignature::four_four());
    m.add(note("C4", Duration::half()));
    assert!(matches!(
        build(vec![m.clone()]),
        Err(ScoreError::MeasureUnderfill { measure_index: 0, .. })
    ));

    m.set_partial(true);
    let mut next = MeasureBuilder::new();
    next.add(note("G4", Duration::whole()));
    let score = build(vec![m, next]).expect("Can not build score");
    assert!(score.has_pickup_measure());
    assert_eq!(score.first_measure_number(), 0);
    assert_eq!(score.last_measure_number(), 1);
    assert_eq!(score.measure_count(), 2);
    assert_eq!(score.full_measure_count(), 1);
    assert_eq!(
        score.score_offset_of(&Position::new(0, 1, 1, 1, 0)),
        Some(Offset::new(1, 2).expect("offset"))
    );
    let pickup = score.part(0).and_then(|p| p.measure(1, 0)).expect("pickup");
    assert!(pickup.is_pickup());
}

#[test]
fn grace_notes_take_no_time() {
    let mut m = measure(TimeSignature::two_four());
    m.add(GraceNoteBuilder::with(
        "B4".parse().expect("pitch"),
        Duration::eighth(),
    ))
    .add(note("C5", Duration::half()));
    let score = build(vec![m]).expect("Can not build score");
    let voice = score
        .part(0)
        .and_then(|p| p.measure(1, 1))
        .and_then(|m| m.voice(1))
        .expect("no voice");
    assert_eq!(voice.offset_of(0), Some(Offset::zero()));
    assert_eq!(voice.offset_of(1), Some(Offset::zero()));
    assert_eq!(voice.get(0).and_then(|e| e.time_value()), None);
}

#[test]
fn inheritance() {
    let mut first = MeasureBuilder::with_attributes(
        TimeSignature::three_four(),
        KeySignature::new(-3).expect("key"),
        Clef::bass(),
    );
    first
        .set_right_barline(Barline::Double)
        .add_clef_change(Offset::new(1, 4).expect("offset"), Clef::alto())
        .add(note("C3", Duration::half().add_dot().expect("dot")));
    let mut second = MeasureBuilder::new();
    second.add(note("D3", Duration::half().add_dot().expect("dot")));
    let mut third = MeasureBuilder::new();
    third
        .set_time_signature(TimeSignature::two_four())
        .set_clef(Clef::treble())
        .add(note("E4", Duration::half()));

    let score = build(vec![first, second, third]).expect("Can not build score");
    let part = score.part(0).expect("no part");
    let second = part.measure(1, 2).expect("no measure");
    assert_eq!(second.time_signature(), TimeSignature::three_four());
    assert_eq!(second.key_signature().fifths(), -3);
    assert_eq!(second.clef(), Clef::alto());
    assert_eq!(second.right_barline(), Barline::Single);
    let third = part.measure(1, 3).expect("no measure");
    assert_eq!(third.time_signature(), TimeSignature::two_four());
    assert_eq!(third.key_signature().fifths(), -3);
    assert_eq!(third.clef(), Clef::treble());
    assert_eq!(
        part.measure(1, 1).map(|m| m.right_barline()),
        Some(Barline::Double)
    );
}

#[test]
fn missing_and_invalid_attributes() {
    let mut m = MeasureBuilder::new();
    m.set_time_signature(TimeSignature::four_four())
        .set_key_signature(KeySignature::c_major());
    match build(vec![m]) {
        Err(ScoreError::MissingAttribute {
            attribute,
            measure_index,
            ..
        }) => {
            assert_eq!(attribute, AttributeKind::Clef);
            assert_eq!(measure_index, 0);
        }
        other => panic!("unexpected result: {:?}", other),
    }
    let mut m = measure(TimeSignature::two_four());
    m.add(note("C4", Duration::half()))
        .add_clef_change(Offset::new(1, 2).expect("offset"), Clef::bass());
    assert!(matches!(
        build(vec![m]),
        Err(ScoreError::InvalidAttribute { .. })
    ));
}

#[test]
fn empty_measure_gets_whole_rest() {
    let mut first = measure(TimeSignature::new(5, 8).expect("time signature"));
    first.add(note("C4", Duration::new(5, 8).expect("duration")));
    let score =
        build(vec![first, MeasureBuilder::new()]).expect("Can not build score");
    let empty = score.part(0).and_then(|p| p.measure(1, 2)).expect("no measure");
    assert!(empty.is_full_measure_rest());
    assert_eq!(
        empty.get(1, 0).map(|e| e.duration()),
        Some(Duration::new(5, 8).expect("duration"))
    );
}

#[test]
fn trim_and_pad_before_build() {
    let four_four = TimeSignature::four_four();
    let mut m = measure(four_four);
    m.add(note("C4", Duration::half()))
        .add(note("D4", Duration::whole()))
        .add_to_voice(2, note("G3", Duration::eighth()));
    m.trim(&four_four).pad_with_rests(&four_four);
    let score = build(vec![m]).expect("Can not build score");
    let measure = score.part(0).and_then(|p| p.measure(1, 1)).expect("no measure");
    assert_eq!(
        measure.get(1, 1).map(|e| e.duration()),
        Some(Duration::half())
    );
    assert_eq!(measure.voice(2).map(|v| v.len()), Some(4));
    assert!(measure
        .voice(2)
        .map(|v| v.iter().skip(1).all(|e| e.is_rest()))
        .unwrap_or(false));

    let mut part = PartBuilder::new("");
    let mut first = measure_with_note(Duration::half());
    first.set_time_signature(TimeSignature::three_four());
    part.add(first).add(measure_with_note(Duration::whole()));
    part.trim().pad_with_rests();
    let mut builder = ScoreBuilder::new();
    builder.add_part(part);
    let score = builder.build().expect("Can not build score");
    assert_eq!(score.measure_count(), 2);
}

fn measure_with_note(duration: Duration) -> MeasureBuilder {
    let mut m = MeasureBuilder::new();
    m.set_key_signature(KeySignature::c_major())
        .set_clef(Clef::treble())
        .add(note("A4", duration));
    m
}

#[test]
fn standalone_measure_build() {
    let mut m = measure(TimeSignature::two_four());
    m.add(note("F4", Duration::quarter()))
        .add(note("A4", Duration::quarter()));
    let built = m.build().expect("Can not build measure");
    assert_eq!(built.number(), 1);
    assert_eq!(MeasureBuilder::from(&built).build().expect("rebuild"), built);
}
