use toroid::config::Config;
use toroid::patterns;
use toroid::session::RunState;
use toroid::session::Session;

fn session(width: i64, height: i64) -> anyhow::Result<Session> {
    let config = Config {
        seed: Some(42),
        ..Config::default()
    };

    Ok(Session::from_config(&config, width, height)?)
}

#[test]
fn test_edits_only_while_stopped() -> anyhow::Result<()> {
    let mut s = session(10, 10)?;
    s.select_stamp(patterns::by_name("blinker").unwrap().stamp()?);

    assert_eq!(s.paint(5, 5).map(|c| c.len()), Some(3));
    assert_eq!(s.automaton().population(), 3);

    s.start();
    assert_eq!(s.paint(0, 0), None);
    assert_eq!(s.preview(0, 0), None);
    assert!(!s.randomize());

    s.pause();
    assert_eq!(s.paint(0, 0), None);
    assert_eq!(s.automaton().population(), 3);

    Ok(())
}

#[test]
fn test_preview_matches_paint() -> anyhow::Result<()> {
    let mut s = session(6, 6)?;
    s.select_stamp(patterns::by_name("glider").unwrap().stamp()?);

    let preview = s.preview(0, 0).unwrap();
    assert_eq!(s.automaton().population(), 0);

    let painted = s.paint(0, 0).unwrap();
    assert_eq!(preview, painted);
    assert_eq!(s.automaton().population(), 5);

    Ok(())
}

#[test]
fn test_stop_clears_from_any_state() -> anyhow::Result<()> {
    let mut s = session(8, 8)?;

    for run in [false, true] {
        s.paint(1, 1);
        s.paint(2, 1);
        s.paint(3, 1);

        if run {
            s.start();
            s.tick();
            s.pause();
        }

        s.stop();
        assert_eq!(s.state(), RunState::Stopped);
        assert_eq!(s.automaton().population(), 0);
        assert_eq!(s.automaton().generation(), 0);
    }

    Ok(())
}

#[test]
fn test_resume_keeps_grid() -> anyhow::Result<()> {
    let mut s = session(5, 5)?;
    s.select_stamp(patterns::by_name("blinker").unwrap().stamp()?);
    s.paint(1, 0);

    s.start();
    s.tick();
    s.pause();
    let paused = s.automaton().clone();

    assert!(!s.tick());
    s.start();
    assert_eq!(s.automaton(), &paused);

    s.tick();
    assert_eq!(s.automaton().generation(), 2);
    assert!(s.automaton().is_alive(0, 0));
    assert!(s.automaton().is_alive(2, 0));

    Ok(())
}

#[test]
fn test_seeded_randomize_is_reproducible() -> anyhow::Result<()> {
    let mut a = session(16, 16)?;
    let mut b = session(16, 16)?;

    assert!(a.randomize());
    assert!(b.randomize());
    assert_eq!(a.automaton(), b.automaton());

    let population = a.automaton().population();
    assert!(population > 0 && population < 256);

    Ok(())
}

#[test]
fn test_config_rule_is_used() -> anyhow::Result<()> {
    let config = Config {
        rule: "B36/S23".parse()?,
        ..Config::default()
    };
    let s = Session::from_config(&config, 4, 4)?;

    assert_eq!(s.automaton().rule().to_string(), "B36/S23");

    Ok(())
}
