//! # Outbound Email
//!
//! Transactional messages sent to customers. Delivery goes through the
//! [`Mailer`] trait; [`LogMailer`] records each message in the log instead
//! of handing it to an SMTP relay. Send failures never fail the request
//! that triggered them.

use async_trait::async_trait;
use eyre::Result;
use smokecheck_core::models::appointment::{Appointment, EmissionTestResult};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, message: EmailMessage) -> Result<()>;
}

/// Writes each message to the log.
pub struct LogMailer {
    from: String,
    enabled: bool,
}

impl LogMailer {
    pub fn new(from: impl Into<String>, enabled: bool) -> Self {
        Self {
            from: from.into(),
            enabled,
        }
    }
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, message: EmailMessage) -> Result<()> {
        if !self.enabled {
            debug!(%to, subject = %message.subject, "email disabled, not sending");
            return Ok(());
        }
        info!(from = %self.from, %to, subject = %message.subject, "email dispatched");
        Ok(())
    }
}

/// Sends `message`, logging instead of failing when delivery breaks.
pub async fn deliver(mailer: &dyn Mailer, to: &str, message: EmailMessage) {
    let subject = message.subject.clone();
    if let Err(err) = mailer.send(to, message).await {
        warn!(%to, %subject, error = %err, "failed to send email");
    }
}

fn layout(accent: &str, heading: &str, body: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: {accent}; color: white; padding: 20px; text-align: center;">
    <h1>{heading}</h1>
  </div>
  <div style="padding: 20px; background: #f9f9f9;">
{body}
    <p style="color: #666; font-size: 12px; margin-top: 30px;">
      This is an automated email. Please do not reply to this message.
    </p>
  </div>
</div>"#
    )
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn booking_confirmation(appointment: &Appointment) -> EmailMessage {
    let vehicle = &appointment.vehicle_info;
    let body = format!(
        r#"    <p>Hello <strong>{name}</strong>,</p>
    <p>Your smoke emission test appointment has been successfully booked.</p>
    <div style="background: white; padding: 15px; border-radius: 8px; margin: 20px 0;">
      <h3>Appointment Details:</h3>
      <p><strong>Service:</strong> {service}</p>
      <p><strong>Date:</strong> {date}</p>
      <p><strong>Time:</strong> {time}</p>
      <p><strong>Vehicle:</strong> {make} {model} ({plate})</p>
      <p><strong>Amount:</strong> ₱{amount:.2}</p>
    </div>
    <p><strong>Next Steps:</strong></p>
    <ol>
      <li>Upload your payment receipt (if not done yet)</li>
      <li>Wait for admin approval</li>
      <li>Visit our center on your scheduled date</li>
    </ol>"#,
        name = escape(&appointment.user_name),
        service = escape(&appointment.service_name),
        date = appointment.appointment_date,
        time = appointment.appointment_time,
        make = escape(&vehicle.make),
        model = escape(&vehicle.model),
        plate = escape(&vehicle.plate_number),
        amount = appointment.payment_details.amount,
    );

    EmailMessage {
        subject: "Appointment Booking Confirmation - SET CAM".to_string(),
        html: layout("#DC143C", "Appointment Confirmed!", &body),
    }
}

pub fn appointment_approved(appointment: &Appointment) -> EmailMessage {
    let body = format!(
        r#"    <p>Good news, <strong>{name}</strong>!</p>
    <p>Your payment has been verified and your appointment has been approved.</p>
    <div style="background: white; padding: 15px; border-radius: 8px; margin: 20px 0;">
      <h3>Appointment Schedule:</h3>
      <p><strong>Date:</strong> {date}</p>
      <p><strong>Time:</strong> {time}</p>
      <p><strong>Service:</strong> {service}</p>
    </div>
    <p><strong>What to bring:</strong></p>
    <ul>
      <li>Vehicle Registration (OR/CR)</li>
      <li>Valid ID</li>
      <li>Payment receipt</li>
    </ul>"#,
        name = escape(&appointment.user_name),
        date = appointment.appointment_date,
        time = appointment.appointment_time,
        service = escape(&appointment.service_name),
    );

    EmailMessage {
        subject: "Appointment Approved - SET CAM".to_string(),
        html: layout("#10B981", "Appointment Approved!", &body),
    }
}

pub fn appointment_rejected(appointment: &Appointment, reason: &str) -> EmailMessage {
    let body = format!(
        r#"    <p>Hello <strong>{name}</strong>,</p>
    <p>Unfortunately, we were unable to verify your payment for the following appointment:</p>
    <div style="background: white; padding: 15px; border-radius: 8px; margin: 20px 0;">
      <p><strong>Service:</strong> {service}</p>
      <p><strong>Date:</strong> {date}</p>
      <p><strong>Time:</strong> {time}</p>
    </div>
    <div style="background: #FEE2E2; padding: 15px; border-radius: 8px; margin: 20px 0;">
      <p style="margin: 0; color: #991B1B;"><strong>Reason:</strong> {reason}</p>
    </div>
    <p>Please upload a clear and valid payment receipt, or contact us for assistance.</p>"#,
        name = escape(&appointment.user_name),
        service = escape(&appointment.service_name),
        date = appointment.appointment_date,
        time = appointment.appointment_time,
        reason = escape(reason),
    );

    EmailMessage {
        subject: "Appointment Payment Issue - SET CAM".to_string(),
        html: layout("#EF4444", "Payment Verification Issue", &body),
    }
}

pub fn test_completed(appointment: &Appointment, result: &EmissionTestResult) -> EmailMessage {
    let remarks = result
        .remarks
        .as_deref()
        .filter(|remarks| !remarks.trim().is_empty())
        .map(|remarks| format!("\n      <p><strong>Remarks:</strong> {}</p>", escape(remarks)))
        .unwrap_or_default();
    let body = format!(
        r#"    <p>Hello <strong>{name}</strong>,</p>
    <p>Your vehicle emission test has been completed.</p>
    <div style="background: white; padding: 15px; border-radius: 8px; margin: 20px 0;">
      <h3>Test Results:</h3>
      <p><strong>Vehicle:</strong> {plate}</p>
      <p><strong>CO2 Level:</strong> {co2} ppm</p>
      <p><strong>Smoke Opacity:</strong> {opacity}%</p>
      <p><strong>Result:</strong> {outcome}</p>{remarks}
    </div>
    <p>You can view and print your certificate by logging into your account.</p>"#,
        name = escape(&appointment.user_name),
        plate = escape(&appointment.vehicle_info.plate_number),
        co2 = result.co2_level,
        opacity = result.smoke_opacity,
        outcome = result.result.label(),
    );

    EmailMessage {
        subject: "Emission Test Results Available - SET CAM".to_string(),
        html: layout("#6B21A8", "Test Results Ready", &body),
    }
}

pub fn one_time_code(code: &str, ttl_minutes: i64) -> EmailMessage {
    let body = format!(
        r#"    <p>Hello,</p>
    <p>Your OTP code for password reset is:</p>
    <div style="background: white; padding: 30px; text-align: center; border-radius: 8px; margin: 20px 0;">
      <h1 style="font-size: 48px; letter-spacing: 10px; margin: 0;">{code}</h1>
    </div>
    <p><strong>This code will expire in {ttl_minutes} minutes.</strong></p>
    <p>If you didn't request this code, please ignore this email.</p>"#
    );

    EmailMessage {
        subject: "Your OTP Code - SET CAM".to_string(),
        html: layout("#DC143C", "Verification Code", &body),
    }
}
