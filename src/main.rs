use indicatif::ProgressBar;
use razornet::{DistMatrix, Razor};
use std::env;
use std::fs;

fn main() {
    simple_logger::init_with_level(log::Level::Info).unwrap();

    let path = env::args().nth(1).unwrap_or_else(|| String::from("distances.csv"));
    let contents = fs::read_to_string(&path).expect("Unable to read file");
    let rows = contents.lines()
        .map(|s| s.split(',').map(|num| num.trim().parse::<f64>().unwrap()).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let matrix = DistMatrix::from_rows(rows).expect("Malformed distance matrix");
    let razor = Razor::default_params(&matrix);
    let mut progress = ProgressBar::new(0);
    let result = razor.reconstruct(&mut progress);
    progress.finish_and_clear();

    match result {
        Ok(reconstruction) => {
            for (u, v) in reconstruction.graph.edges() {
                println!("{u},{v},{}", reconstruction.matrix.get(u, v));
            }
        }
        Err(error) => eprintln!("Reconstruction failed: {error}"),
    }
}
