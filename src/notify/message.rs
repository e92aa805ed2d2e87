use crate::monitor::LabeledEvent;

const SOL_DECIMALS: u8 = 9;

/// Render a base-unit amount with `decimals` places, dropping trailing zeros.
///
/// Integer-only, so large amounts keep every digit.
pub fn format_units(amount: u64, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let padded = if digits.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - digits.len()), digits)
    } else {
        digits
    };
    let (whole, fraction) = padded.split_at(padded.len() - decimals);
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        whole.to_string()
    } else {
        format!("{}.{}", whole, fraction)
    }
}

pub fn render_event(labeled: &LabeledEvent) -> String {
    let profit = format_units(labeled.event.profit, labeled.token.decimals);
    let mut message = format!(
        "📈 📉 New arbitrage trade made on Jupiter {} for a profit of {} {}.",
        labeled.program_label, profit, labeled.token.symbol
    );
    if labeled.event.fee_was_elevated {
        message.push_str(&format!(
            "\n🚀 Tx fee was increased to {} SOL to boost priority.",
            format_units(labeled.event.fee, SOL_DECIMALS)
        ));
    }
    message
}

/// One message for a cycle's new events, or `None` when there are none.
pub fn render_cycle(events: &[LabeledEvent]) -> Option<String> {
    if events.is_empty() {
        return None;
    }
    Some(
        events
            .iter()
            .map(render_event)
            .collect::<Vec<_>>()
            .join("\n"),
    )
}
