//! writer/fold — нарезка длинного однострочного значения на `\`-продолжения.
//!
//! Ограничения на фрагменты (иначе декодер прочитает иначе):
//! - фрагмент не пуст (пустая строка внутри продолжения — ошибка);
//! - фрагменты после первого не начинаются с `#` или `%` (это комментарий/дескриптор).
//! Если подходящую точку разреза найти нельзя, хвост пишется без нарезки.

use crate::consts::{COMMENT_BYTE, DESCRIPTOR_BYTE};

/// `first_room` — сколько байт доступно под значение в первой строке (после `name: `),
/// `width` — ширина следующих строк. Обе включают место под хвостовой `\`.
pub fn fold_value(value: &str, first_room: usize, width: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut rest = value;
    // бюджет непоследнего фрагмента: строка минус `\`
    let mut budget = first_room.saturating_sub(1);

    // последний фрагмент `\` не несёт, поэтому влезает на байт больше
    while rest.len() > budget + 1 {
        let mut cut = budget;
        while cut > 0 && !(rest.is_char_boundary(cut) && cut_ok(rest, cut)) {
            cut -= 1;
        }
        if cut == 0 {
            break;
        }
        out.push(&rest[..cut]);
        rest = &rest[cut..];
        budget = width.saturating_sub(1);
    }
    out.push(rest);
    out
}

fn cut_ok(s: &str, cut: usize) -> bool {
    !matches!(s.as_bytes().get(cut), Some(&COMMENT_BYTE) | Some(&DESCRIPTOR_BYTE) | None)
}
