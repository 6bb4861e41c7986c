use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};
use line_editor_core::{
    Command, CommandExecutor, CursorCommand, EditCommand, EditorSession, EditorStateManager,
    Movement, SearchOptions,
};

fn large_text(line_count: usize) -> String {
    let mut out = String::with_capacity(line_count * 64);
    for i in 0..line_count {
        out.push_str(&format!(
            "{i:06} the quick brown fox jumps over the lazy dog (line-editor-core benchmark line)\n"
        ));
    }
    // No trailing empty line.
    out.pop();
    out
}

fn bench_large_file_open(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("large_file_open/50k_lines", |b| {
        b.iter(|| {
            let state = EditorStateManager::new(black_box(&text));
            black_box(state.session().line_count());
        })
    });
}

fn bench_typing_in_middle(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("typing_middle/100_inserts", |b| {
        b.iter_batched(
            || {
                let mut executor = CommandExecutor::new(&text);
                executor
                    .execute(Command::Cursor(CursorCommand::MoveTo {
                        line: 25_000,
                        character: 10,
                    }))
                    .unwrap();
                executor
            },
            |mut executor| {
                for _ in 0..100 {
                    executor
                        .execute(Command::Edit(EditCommand::InsertText {
                            text: "x".to_string(),
                        }))
                        .unwrap();
                }
                black_box(executor.session().cursor_position());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_paste_and_undo(c: &mut Criterion) {
    let text = large_text(50_000);
    let paste = large_text(5_000);
    c.bench_function("paste_undo/5k_lines_into_50k", |b| {
        b.iter_batched(
            || EditorSession::from_text(&text),
            |mut session| {
                session.move_cursor(Movement::DocumentEnd, false);
                session.insert_text(black_box(&paste)).unwrap();
                session.undo();
                black_box(session.line_count());
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_replace_all(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("replace_all/50k_lines", |b| {
        b.iter_batched(
            || EditorSession::from_text(&text),
            |mut session| {
                let replaced = session
                    .replace_all("lazy", SearchOptions::default(), "sleepy")
                    .unwrap();
                black_box(replaced);
            },
            BatchSize::LargeInput,
        )
    });
}

fn bench_longest_line(c: &mut Criterion) {
    let text = large_text(50_000);
    c.bench_function("longest_line/recompute_50k", |b| {
        b.iter_batched(
            || EditorSession::from_text(&text),
            |mut session| black_box(session.longest_line()),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(
    benches,
    bench_large_file_open,
    bench_typing_in_middle,
    bench_paste_and_undo,
    bench_replace_all,
    bench_longest_line
);
criterion_main!(benches);
