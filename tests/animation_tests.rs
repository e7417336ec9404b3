mod common;

use common::{HOLD, RecordingRegisters, Toggle, sequence_toggles};
use embassy_futures::block_on;
use octolamp::{AnimationPlayer, OutputLine, OutputRegisters, Sequence};

#[test]
fn arrival_pulses_lines_in_order() {
    let player = AnimationPlayer::new(RecordingRegisters::new(), HOLD);

    block_on(player.play(Sequence::Arrival));

    assert_eq!(
        player.registers().toggles(),
        [
            Toggle::On(OutputLine::A),
            Toggle::Off(OutputLine::A),
            Toggle::On(OutputLine::B),
            Toggle::Off(OutputLine::B),
            Toggle::On(OutputLine::C),
            Toggle::Off(OutputLine::C),
        ]
    );
}

#[test]
fn departure_pulses_lines_in_reverse() {
    let player = AnimationPlayer::new(RecordingRegisters::new(), HOLD);

    block_on(player.play(Sequence::Departure));

    assert_eq!(
        player.registers().toggles(),
        [
            Toggle::On(OutputLine::C),
            Toggle::Off(OutputLine::C),
            Toggle::On(OutputLine::B),
            Toggle::Off(OutputLine::B),
            Toggle::On(OutputLine::A),
            Toggle::Off(OutputLine::A),
        ]
    );
}

#[test]
fn every_line_is_held_high() {
    let player = AnimationPlayer::new(RecordingRegisters::new(), HOLD);

    block_on(player.play(Sequence::Arrival));

    let timed = player.registers().timed_toggles();
    for pulse in timed.chunks(2) {
        let [(Toggle::On(on), raised), (Toggle::Off(off), lowered)] = pulse else {
            panic!("unexpected pulse shape: {:?}", pulse);
        };
        assert_eq!(on, off);
        assert!(*lowered - *raised >= HOLD);
    }
}

#[test]
fn sequences_end_with_all_lines_low() {
    let player = AnimationPlayer::new(RecordingRegisters::new(), HOLD);
    player.registers().set_line(OutputLine::B);

    block_on(player.play(Sequence::Departure));

    assert!(player.registers().lit().is_empty());
}

#[test]
fn clear_all_lowers_every_line() {
    let player = AnimationPlayer::new(RecordingRegisters::new(), HOLD);
    player.set_line(OutputLine::A);
    player.set_line(OutputLine::C);
    player.registers().clear_log();

    player.clear_all();

    assert!(player.registers().lit().is_empty());
    assert_eq!(
        player.registers().toggles(),
        sequence_toggles(Sequence::Arrival)
            .into_iter()
            .filter(|toggle| matches!(toggle, Toggle::Off(_)))
            .collect::<Vec<_>>()
    );
}
