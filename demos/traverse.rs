use std::io::{self, Write};

use avltree::{AvlTree, PrintMode};

fn main() -> io::Result<()> {
    let mut tree = AvlTree::new();
    for key in (5..100).step_by(11) {
        tree.insert(key);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out, "In-order traversal:")?;
    tree.write_inorder(&mut out, PrintMode::Simple)?;
    writeln!(out)?;

    writeln!(out, "Breadth-first traversal:")?;
    tree.write_breadth_first(&mut out)?;

    Ok(())
}
