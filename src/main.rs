use PackedBedSim::Examples::dme_synthesis::reactor_examples;
use PackedBedSim::Utils::logging::init_logger;
use log::LevelFilter;

pub fn main() {
    if let Err(e) = init_logger(LevelFilter::Info) {
        eprintln!("logger not started: {}", e);
    }
    // 0 - M4, 1 - M3, 2 - M1, 3 - M5
    let task: usize = 0;
    reactor_examples(task);
}
