//! Interactive command-line front end for the Connect Four solver.
//!
//! Plays a human against the engine (or replays a pre-set opening), printing the board after
//! every move and asking for a column index on the human's turn.

use std::error::Error;
use std::io::{self, Write};

use clap::Parser;
use connect_four_solver::{Engine, Position};

#[derive(Parser)]
#[command(about = "Play against a perfect Connect Four solver")]
struct Args {
    /// A sequence of column digits (1-7) to seed the starting position with.
    #[arg(long, default_value = "")]
    moves: String,

    /// Print search statistics and the principal variation after every engine move.
    #[arg(long)]
    log: bool,

    /// Let the engine play both sides.
    #[arg(long)]
    computer_only: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let mut position = Position::from_moves(&args.moves)?;
    let mut engine = Engine::new();

    loop {
        print_board(&position);

        if position.is_terminal_won() {
            let winner = if position.side_to_move() == 0 { "Player 2" } else { "Player 1" };
            println!("Game over. {winner} won!");
            return Ok(());
        }
        if position.valid_move_mask() == 0 {
            println!("Game over. It's a draw.");
            return Ok(());
        }

        let humans_turn = position.side_to_move() == 0 && !args.computer_only;

        let column = if humans_turn {
            read_human_move(&position)?
        } else {
            let result = engine.search(&position, args.log)?;
            let column = column_of(result.move_mask);
            println!("Engine plays column {} ({})", column + 1, result.value);
            column
        };

        position.apply_column(column)?;
    }
}

/// Reads and validates a column choice from stdin, reprompting on invalid input.
fn read_human_move(position: &Position) -> Result<usize, Box<dyn Error>> {
    loop {
        print!("Your move (1-{}): ", Position::WIDTH);
        io::stdout().flush()?;

        let mut line = String::new();
        io::stdin().read_line(&mut line)?;

        let Ok(choice) = line.trim().parse::<usize>() else {
            println!("Invalid move: not a number");
            continue;
        };
        if choice == 0 || choice > Position::WIDTH {
            println!("Invalid move: out of range");
            continue;
        }

        let column = choice - 1;
        if !position.is_move_valid(column) {
            println!("Invalid move: column is full");
            continue;
        }

        return Ok(column);
    }
}

/// Prints the board as a grid with `@` for player 1, `O` for player 2, top row first.
fn print_board(position: &Position) {
    for y in (0..Position::HEIGHT).rev() {
        for x in 0..Position::WIDTH {
            let symbol = match position.cell(x, y) {
                Some(0) => '@',
                Some(1) => 'O',
                _ => '.',
            };
            print!("{symbol} ");
        }
        println!();
    }
    for x in 1..=Position::WIDTH {
        print!("{x} ");
    }
    println!();
}

/// Returns the column a single-bit move mask falls in.
fn column_of(move_mask: u64) -> usize {
    for x in 0..Position::WIDTH {
        if (move_mask >> (x * 8)) & 0xff != 0 {
            return x;
        }
    }
    0
}
