use slipway_core::booking::Booking;
use slipway_core::notify::EmailMessage;

/// "ZAR 1 750" style rendering, whole rand with thin grouping.
pub fn format_amount(cents: i32) -> String {
    let rand = (cents / 100).to_string();
    let mut grouped = String::new();
    let digits: Vec<char> = rand.chars().collect();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(*c);
    }
    format!("ZAR {}", grouped)
}

fn session_lines(booking: &Booking) -> String {
    let mut lines = format!(
        "Ride:  {}\nDate:  {}\nTime:  {} - {}\n",
        booking.unit_id,
        booking.starts_at.format("%Y-%m-%d"),
        booking.starts_at.format("%H:%M"),
        booking.ends_at.format("%H:%M"),
    );
    if !booking.passengers.is_empty() {
        lines.push_str(&format!("Passengers: {}\n", booking.passengers.join(", ")));
    }
    lines
}

pub fn payment_confirmation(from_name: &str, booking: &Booking) -> EmailMessage {
    let reference = booking.payment_ref.as_deref().unwrap_or("-");
    EmailMessage {
        to: booking.email.clone(),
        reply_to: None,
        subject: "Booking confirmed - payment received".to_string(),
        body: format!(
            "Hi {},\n\nWe've received your payment of {}.\n\n{}\nPayment reference: {}\n\n\
             We'll see you at the water. If you have any questions, simply reply \
             to this email.\n\n{}",
            booking.full_name,
            format_amount(booking.amount_cents),
            session_lines(booking),
            reference,
            from_name,
        ),
    }
}

pub fn admin_paid_notice(admin_address: &str, booking: &Booking) -> EmailMessage {
    let reference = booking.payment_ref.as_deref().unwrap_or("-");
    EmailMessage {
        to: admin_address.to_string(),
        reply_to: Some(booking.email.clone()),
        subject: format!("Paid booking - {}", reference),
        body: format!(
            "A booking was paid.\n\n{}\nCustomer: {} <{}> ({})\nAmount: {}\n\
             Payment reference: {}\n",
            session_lines(booking),
            booking.full_name,
            booking.email,
            booking.phone,
            format_amount(booking.amount_cents),
            reference,
        ),
    }
}

pub fn payment_failure(from_name: &str, booking: &Booking) -> EmailMessage {
    EmailMessage {
        to: booking.email.clone(),
        reply_to: None,
        subject: "Payment unsuccessful - booking not confirmed".to_string(),
        body: format!(
            "Hi {},\n\nYour payment did not go through, so the booking below is \
             not confirmed.\n\n{}\nYou can start a new booking at any time; the \
             time slot has been released. If you believe this is an error, reply \
             to this email.\n\n{}",
            booking.full_name,
            session_lines(booking),
            from_name,
        ),
    }
}

pub fn status_update(from_name: &str, booking: &Booking, message: &str) -> EmailMessage {
    EmailMessage {
        to: booking.email.clone(),
        reply_to: None,
        subject: format!("Booking update - {}", booking.status),
        body: format!(
            "Hi {},\n\nWe've updated the status of your booking to {}.\n\n{}\n\
             Message from the team:\n{}\n\n{}",
            booking.full_name,
            booking.status,
            session_lines(booking),
            message,
            from_name,
        ),
    }
}

pub fn contact_message(
    admin_address: &str,
    full_name: &str,
    email: &str,
    phone: &str,
    message: &str,
) -> EmailMessage {
    EmailMessage {
        to: admin_address.to_string(),
        reply_to: Some(email.to_string()),
        subject: "New contact message".to_string(),
        body: format!(
            "You received a new message via the contact form.\n\n\
             Name:  {}\nEmail: {}\nPhone: {}\n\n{}\n",
            full_name, email, phone, message,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount_groups_thousands() {
        assert_eq!(format_amount(70_000), "ZAR 700");
        assert_eq!(format_amount(175_000), "ZAR 1 750");
        assert_eq!(format_amount(1_100_000), "ZAR 11 000");
    }
}
