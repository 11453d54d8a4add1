use dice_calc::{DiceCalculator, Distribution, Evaluation, Method};
use std::io::{self, BufRead, Write};

const BAR_WIDTH: f64 = 50.0;

fn method_command(line: &str) -> Option<Method> {
    Some(match line {
        ":roll" => Method::Roll,
        ":conv" => Method::Convolution,
        ":comb" => Method::Combination,
        ":auto" => Method::Auto,
        _ => return None,
    })
}

fn print_chart(d: &Distribution) {
    let peak = d.outcomes().map(|(_, p)| p).fold(0.0, f64::max);
    for (value, p) in d.outcomes() {
        let width = if peak > 0.0 { (p / peak * BAR_WIDTH).round() as usize } else { 0 };
        println!("{:>6} {:>8.4}% {}", value, p * 100.0, "#".repeat(width));
    }
    if let (Some(mean), Some(sd)) = (d.mean(), d.std_dev()) {
        println!("mean {:.3}, std dev {:.3}", mean, sd);
    }
}

fn print_evaluation(result: &Evaluation) {
    match result {
        Evaluation::Sample(x) => println!("{}", x),
        Evaluation::Distribution(d) => print_chart(d),
        Evaluation::Combinations(x) => {
            println!("{} combinations", x.len());
            print_chart(&Distribution::from_enumeration(x));
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let calc = DiceCalculator::new()?;
    let mut rng = rand::thread_rng();
    let mut method = Method::Auto;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    print!("{}> ", method);
    io::stdout().flush()?;
    while let Some(Ok(line)) = lines.next() {
        let line = line.trim();
        if let Some(m) = method_command(line) {
            method = m;
        } else if !line.is_empty() {
            match calc
                .parse(line)
                .and_then(|ast| calc.evaluate(&ast, method, &mut rng))
            {
                Ok(r) => print_evaluation(&r),
                Err(why) => eprintln!("Error: {}", why),
            }
        }
        print!("{}> ", method);
        io::stdout().flush()?;
    }
    Ok(())
}
