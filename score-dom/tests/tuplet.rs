use score_dom::{
    builders::{
        ChordBuilder, DurationalBuilder, GraceNoteBuilder, MeasureBuilder,
        NoteBuilder, PartBuilder, RestBuilder, ScoreBuilder,
    },
    dom::{Connected, Score},
    error::ScoreError,
    notation::{Notation, NotationKind},
    primitives::{Clef, Duration, KeySignature, Offset, Pitch, Position, TimeSignature},
};

fn c4(duration: Duration) -> NoteBuilder {
    NoteBuilder::with("C4".parse::<Pitch>().expect("pitch"), duration)
}

/// Link every element of the group to the next one under one handle.
fn tuplet(
    actual: u32,
    normal: u32,
    mut group: Vec<DurationalBuilder>,
) -> Vec<DurationalBuilder> {
    let notation = Notation::tuplet(actual, normal);
    let ids = group.iter().map(|b| b.id()).collect::<Vec<_>>();
    for (element, next) in group.iter_mut().zip(ids.into_iter().skip(1)) {
        element.connect_with(notation, &next);
    }
    group
}

fn build(voice: Vec<DurationalBuilder>) -> Result<Score, ScoreError> {
    let mut measure = MeasureBuilder::with_attributes(
        TimeSignature::two_four(),
        KeySignature::c_major(),
        Clef::treble(),
    );
    for element in voice {
        measure.add(element);
    }
    let mut part = PartBuilder::new("Clarinet");
    part.add(measure);
    let mut builder = ScoreBuilder::new();
    builder.add_part(part);
    builder.build()
}

#[test]
fn triplet() {
    let mut voice: Vec<DurationalBuilder> = vec![c4(Duration::quarter()).into()];
    voice.extend(tuplet(
        3,
        2,
        vec![
            c4(Duration::quarter_triplet()).into(),
            c4(Duration::eighth_triplet()).into(),
        ],
    ));
    let score = build(voice).expect("Can not build score");
    let start = Position::single_staff(0, 1, 1, 1);
    let kind = NotationKind::Tuplet {
        actual: 3,
        normal: 2,
    };
    assert_eq!(
        score.follow_chain(&start, kind),
        vec![start, Position::single_staff(0, 1, 1, 2)]
    );
    let head = score.get(&start).expect("no element");
    assert!(head.has_connection(kind));
    assert_eq!(
        score
            .measure(&start)
            .and_then(|m| m.voice(1))
            .and_then(|v| v.offset_of(2)),
        Some(Offset::new(5, 12).expect("offset"))
    );
}

#[test]
fn triplet_of_note_rest_and_chord() {
    let eighth = Duration::eighth().tuplet(3, 2).expect("tuplet");
    let mut voice = tuplet(
        3,
        2,
        vec![
            c4(eighth).into(),
            RestBuilder::new(eighth).into(),
            ChordBuilder::from_pitches(
                vec![
                    "C4".parse::<Pitch>().expect("pitch"),
                    "D4".parse::<Pitch>().expect("pitch"),
                ],
                eighth,
            )
            .into(),
        ],
    );
    voice.push(c4(Duration::quarter()).into());
    let score = build(voice).expect("Can not build score");
    let rest = score
        .connections_at(&Position::single_staff(0, 1, 1, 1))
        .expect("no rest");
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].preceding(), Some(Position::single_staff(0, 1, 1, 0)));
    assert_eq!(rest[0].following(), Some(Position::single_staff(0, 1, 1, 2)));
}

#[test]
fn tuplet_elements_must_be_adjacent() {
    let notation = Notation::tuplet(3, 2);
    let end = c4(Duration::eighth_triplet());
    let mut start = c4(Duration::eighth_triplet());
    start.connect_with(notation, &end);
    let voice: Vec<DurationalBuilder> = vec![
        start.into(),
        c4(Duration::eighth_triplet()).into(),
        end.into(),
        c4(Duration::quarter()).into(),
    ];
    assert!(matches!(
        build(voice),
        Err(ScoreError::InvalidConnection { .. })
    ));
}

#[test]
fn grace_notes_are_not_in_tuplets() {
    let notation = Notation::tuplet(3, 2);
    let end = c4(Duration::quarter_triplet());
    let mut grace =
        GraceNoteBuilder::with("D4".parse().expect("pitch"), Duration::eighth());
    grace.connect_with(notation, &end);
    let voice: Vec<DurationalBuilder> = vec![
        grace.into(),
        end.into(),
        c4(Duration::quarter_triplet()).into(),
        c4(Duration::quarter_triplet()).into(),
    ];
    assert!(matches!(
        build(voice),
        Err(ScoreError::InvalidConnection { .. })
    ));
}
