use beat_meter::{fetcher::DummyFetcher, Session, SessionConfig};

fn main() {
    let mut session = Session::new(DummyFetcher::new(), SessionConfig::default()).unwrap();

    session.on_frame(0.);
    let readout = session.on_tick(0.);

    println!("{} bpm, {}", readout.bpm, readout.color);
}
